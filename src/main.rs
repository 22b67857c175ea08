//! Reflex Rush entry point
//!
//! The wasm build wires the engine to the browser DOM; the native build runs
//! a headless demo session with a scripted player.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlButtonElement, HtmlElement, MouseEvent};

    use reflex_rush::consts::*;
    use reflex_rush::sim::{Engine, GameEvent, PlayArea};
    use reflex_rush::{HighScores, Settings};

    /// Target gradients from the original palette; index = cosmetic variant
    const TARGET_STYLES: [(&str, &str); TARGET_VARIANTS] = [
        (
            "radial-gradient(circle, #ff9a9e, #ff5252)",
            "rgba(255, 82, 82, 0.4)",
        ),
        (
            "radial-gradient(circle, #a6c0fe, #5a67d8)",
            "rgba(90, 103, 216, 0.4)",
        ),
        (
            "radial-gradient(circle, #96e6a1, #20bf6b)",
            "rgba(32, 191, 107, 0.4)",
        ),
        (
            "radial-gradient(circle, #ffecd2, #fcb69f)",
            "rgba(252, 182, 159, 0.4)",
        ),
        (
            "radial-gradient(circle, #e0c3fc, #8a5fff)",
            "rgba(138, 95, 255, 0.4)",
        ),
    ];

    /// Background gradient per level
    const LEVEL_BACKGROUNDS: [&str; MAX_LEVEL as usize] = [
        "linear-gradient(135deg, #6e8efb, #a777e3)",
        "linear-gradient(135deg, #ff9a9e, #fad0c4)",
        "linear-gradient(135deg, #a6c0fe, #f68084)",
        "linear-gradient(135deg, #d4fc79, #96e6a1)",
        "linear-gradient(135deg, #e0c3fc, #8ec5fc)",
    ];

    /// Static styling, scoped under rr- ids/classes so the adapter stays
    /// self-contained. The HUD band height matches consts::HUD_INSET.
    const GAME_CSS: &str = "\
body { margin: 0; font-family: 'Segoe UI', sans-serif; }
#rr-container { position: relative; width: 100vw; height: 100vh; overflow: hidden; }
#rr-hud { position: absolute; top: 0; left: 0; right: 0; height: 60px; display: flex; align-items: center; justify-content: space-around; color: #fff; background: rgba(0, 0, 0, 0.25); z-index: 2; }
#rr-timer-bar { position: absolute; top: 60px; left: 0; height: 4px; width: 100%; background: rgba(255, 255, 255, 0.85); transition: width 0.3s linear; }
#rr-target { position: absolute; border-radius: 50%; cursor: pointer; display: none; user-select: none; z-index: 1; }
#rr-start { padding: 6px 14px; border: none; border-radius: 4px; cursor: pointer; font-weight: bold; }
#rr-overlay { position: absolute; inset: 0; display: none; flex-direction: column; align-items: center; justify-content: center; color: #fff; background: rgba(0, 0, 0, 0.55); z-index: 3; }
.rr-popup { position: absolute; color: #fff; font-weight: bold; pointer-events: none; z-index: 2; animation: rr-float 0.8s ease-out forwards; }
@keyframes rr-float { from { opacity: 1; transform: translateY(0); } to { opacity: 0; transform: translateY(-50px); } }
";

    /// Everything the event handlers share
    struct Game {
        engine: Engine,
        settings: Settings,
        highscores: HighScores,
        /// Viewport position of the latest target click, for score popups
        last_pointer: (f32, f32),
    }

    /// Handles to every element the renderer touches
    struct Dom {
        container: HtmlElement,
        score: Element,
        time: Element,
        level: Element,
        combo: Element,
        timer_bar: HtmlElement,
        target: HtmlElement,
        start_button: HtmlButtonElement,
        overlay: HtmlElement,
        final_score: Element,
        best_score: Element,
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Reflex Rush starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let dom = Rc::new(build_dom(&document).expect("failed to build game DOM"));

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game {
            engine: Engine::new(seed, measure(&dom)),
            settings: Settings::load(),
            highscores: HighScores::load(),
            last_pointer: (0.0, 0.0),
        }));
        log::info!("Engine initialized with seed {seed}");
        if let Some(best) = game.borrow().highscores.best() {
            log::info!("Best score so far: {best}");
        }

        setup_handlers(&dom, &game);
        start_frame_loop(dom, game);

        log::info!("Reflex Rush running!");
    }

    fn build_dom(document: &Document) -> Result<Dom, JsValue> {
        let body = document.body().ok_or("document has no body")?;

        let css = document.create_element("style")?;
        css.set_text_content(Some(GAME_CSS));
        body.append_child(&css)?;

        let container: HtmlElement = document.create_element("div")?.dyn_into()?;
        container.set_id("rr-container");
        container
            .style()
            .set_property("background", LEVEL_BACKGROUNDS[0])?;
        body.append_child(&container)?;

        let hud: HtmlElement = document.create_element("div")?.dyn_into()?;
        hud.set_id("rr-hud");
        container.append_child(&hud)?;

        let score = stat_value(document, &hud, "Score", "0")?;
        let time = stat_value(document, &hud, "Time", &SESSION_SECONDS.to_string())?;
        let level = stat_value(document, &hud, "Level", "1")?;
        let combo = stat_value(document, &hud, "Combo", "0")?;

        let start_button: HtmlButtonElement = document.create_element("button")?.dyn_into()?;
        start_button.set_id("rr-start");
        start_button.set_text_content(Some("Start Game"));
        hud.append_child(&start_button)?;

        let timer_bar: HtmlElement = document.create_element("div")?.dyn_into()?;
        timer_bar.set_id("rr-timer-bar");
        container.append_child(&timer_bar)?;

        let target: HtmlElement = document.create_element("div")?.dyn_into()?;
        target.set_id("rr-target");
        container.append_child(&target)?;

        let overlay: HtmlElement = document.create_element("div")?.dyn_into()?;
        overlay.set_id("rr-overlay");
        let heading = document.create_element("h1")?;
        heading.set_text_content(Some("Game Over"));
        overlay.append_child(&heading)?;
        let final_score = stat_value(document, &overlay, "Final score", "0")?;
        let best_score = stat_value(document, &overlay, "Best", "0")?;
        container.append_child(&overlay)?;

        Ok(Dom {
            container,
            score,
            time,
            level,
            combo,
            timer_bar,
            target,
            start_button,
            overlay,
            final_score,
            best_score,
        })
    }

    /// "<label>: <value>" span pair appended to `parent`; returns the value
    /// element
    fn stat_value(
        document: &Document,
        parent: &HtmlElement,
        label: &str,
        initial: &str,
    ) -> Result<Element, JsValue> {
        let wrap = document.create_element("span")?;
        wrap.set_text_content(Some(&format!("{label}: ")));
        let value = document.create_element("span")?;
        value.set_text_content(Some(initial));
        wrap.append_child(&value)?;
        parent.append_child(&wrap)?;
        Ok(value)
    }

    fn measure(dom: &Dom) -> PlayArea {
        PlayArea {
            width: dom.container.client_width() as f32,
            height: dom.container.client_height() as f32,
        }
    }

    fn setup_handlers(dom: &Rc<Dom>, game: &Rc<RefCell<Game>>) {
        // Start / Play Again
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().engine.start(now_ms());
            });
            let _ = dom
                .start_button
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Target hit. The DOM element is the hit region, so any click that
        // lands here is an activation.
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.stop_propagation();
                let mut g = game.borrow_mut();
                g.last_pointer = (event.client_x() as f32, event.client_y() as f32);
                g.engine.activate(now_ms());
            });
            let _ = dom
                .target
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize feeds fresh bounds to the next relocation
        {
            let game = game.clone();
            let dom = dom.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().engine.set_play_area(measure(&dom));
            });
            if let Some(window) = web_sys::window() {
                let _ = window
                    .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            }
            closure.forget();
        }
    }

    fn start_frame_loop(dom: Rc<Dom>, game: Rc<RefCell<Game>>) {
        let handle: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        let kick = handle.clone();
        *kick.borrow_mut() = Some(Closure::new(move || {
            {
                let mut g = game.borrow_mut();
                g.engine.advance(now_ms());
                for event in g.engine.drain_events() {
                    render_event(&dom, &mut g, event);
                }
            }
            request_animation_frame(handle.borrow().as_ref().unwrap());
        }));
        request_animation_frame(kick.borrow().as_ref().unwrap());
    }

    fn request_animation_frame(f: &Closure<dyn FnMut()>) {
        if let Some(window) = web_sys::window() {
            let _ = window.request_animation_frame(f.as_ref().unchecked_ref());
        }
    }

    fn now_ms() -> u64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0) as u64
    }

    fn set_text(el: &Element, text: &str) {
        el.set_text_content(Some(text));
    }

    fn render_event(dom: &Dom, game: &mut Game, event: GameEvent) {
        match event {
            GameEvent::SessionStarted => {
                set_text(&dom.score, "0");
                set_text(&dom.combo, "0");
                set_text(&dom.level, "1");
                set_text(&dom.time, &SESSION_SECONDS.to_string());
                let _ = dom.timer_bar.style().set_property("width", "100%");
                let _ = dom
                    .container
                    .style()
                    .set_property("background", LEVEL_BACKGROUNDS[0]);
                let _ = dom.overlay.style().set_property("display", "none");
                dom.start_button.set_disabled(true);
                dom.start_button.set_text_content(Some("Game Running..."));
                log::info!("Session started");
            }
            GameEvent::TimeUpdated { remaining } => {
                set_text(&dom.time, &remaining.to_string());
                let percent = remaining as f32 / SESSION_SECONDS as f32 * 100.0;
                let _ = dom
                    .timer_bar
                    .style()
                    .set_property("width", &format!("{percent:.0}%"));
            }
            GameEvent::TargetMoved { pos, size, variant } => {
                let (background, shadow) = TARGET_STYLES[variant % TARGET_STYLES.len()];
                let style = dom.target.style();
                let _ = style.set_property("left", &format!("{}px", pos.x));
                let _ = style.set_property("top", &format!("{}px", pos.y));
                let _ = style.set_property("width", &format!("{size}px"));
                let _ = style.set_property("height", &format!("{size}px"));
                let _ = style.set_property("background", background);
                let _ = style.set_property("box-shadow", &format!("0 5px 15px {shadow}"));
                let _ = style.set_property("display", "block");
            }
            GameEvent::ComboBroken => {
                set_text(&dom.combo, "0");
            }
            GameEvent::ScoreUpdated {
                score,
                points,
                combo,
                ..
            } => {
                set_text(&dom.score, &score.to_string());
                set_text(&dom.combo, &combo.to_string());
                if game.settings.popups_enabled() {
                    spawn_score_popup(dom, game.last_pointer, points);
                }
            }
            GameEvent::LevelChanged { level, .. } => {
                set_text(&dom.level, &level.to_string());
                let background =
                    LEVEL_BACKGROUNDS[(level as usize - 1).min(LEVEL_BACKGROUNDS.len() - 1)];
                let _ = dom.container.style().set_property("background", background);
                log::info!("Reached level {level}");
            }
            GameEvent::GameOver { final_score } => {
                let _ = dom.target.style().set_property("display", "none");
                let level = game.engine.state().level;
                if let Some(rank) = game.highscores.record(final_score, level, js_sys::Date::now())
                {
                    game.highscores.save();
                    if rank == 1 {
                        log::info!("New best score: {final_score}");
                    }
                }
                set_text(&dom.final_score, &final_score.to_string());
                let best = game.highscores.best().unwrap_or(final_score);
                set_text(&dom.best_score, &best.to_string());
                let _ = dom.overlay.style().set_property("display", "flex");
                dom.start_button.set_disabled(false);
                dom.start_button.set_text_content(Some("Play Again"));
                log::info!("Game over, final score {final_score}");
            }
        }
    }

    /// Floating "+points" marker at the click position, removed after its
    /// animation finishes
    fn spawn_score_popup(dom: &Dom, at: (f32, f32), points: u32) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };
        let Ok(popup) = document.create_element("div") else {
            return;
        };
        popup.set_class_name("rr-popup");
        popup.set_text_content(Some(&format!("+{points}")));

        let rect = dom.container.get_bounding_client_rect();
        if let Ok(popup) = popup.dyn_into::<HtmlElement>() {
            let style = popup.style();
            let _ = style.set_property("left", &format!("{}px", at.0 - rect.left() as f32));
            let _ = style.set_property("top", &format!("{}px", at.1 - rect.top() as f32));
            if dom.container.append_child(&popup).is_err() {
                return;
            }
            let cleanup = Closure::once_into_js(move || popup.remove());
            let _ = window
                .set_timeout_with_callback_and_timeout_and_arguments_0(cleanup.unchecked_ref(), 800);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Reflex Rush (native) starting...");
    demo_session();
}

/// Headless demo: a scripted player with ~180 ms reaction time plays one
/// session against a synthetic clock, whiffing every fifth target so combos
/// visibly break.
#[cfg(not(target_arch = "wasm32"))]
fn demo_session() {
    use reflex_rush::sim::{Engine, GameEvent, PlayArea};

    let mut engine = Engine::new(
        0xC0FFEE,
        PlayArea {
            width: 900.0,
            height: 700.0,
        },
    );
    engine.start(0);

    let mut now = 0u64;
    let mut click_at: Option<u64> = None;
    let mut seen_targets = 0u32;

    while engine.state().is_running() {
        now += 16;
        engine.advance(now);
        if click_at.is_some_and(|t| t <= now) {
            engine.activate(now);
            click_at = None;
        }
        for event in engine.drain_events() {
            match event {
                GameEvent::TargetMoved { .. } => {
                    seen_targets += 1;
                    if seen_targets % 5 != 0 {
                        click_at = Some(now + 180);
                    } else {
                        click_at = None;
                    }
                }
                GameEvent::LevelChanged { level, .. } => log::info!("reached level {level}"),
                GameEvent::ComboBroken => log::debug!("combo broken"),
                GameEvent::GameOver { final_score } => {
                    println!(
                        "final score: {final_score} (level {})",
                        engine.state().level
                    );
                }
                _ => {}
            }
        }
    }
}
