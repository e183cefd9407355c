//! Browser shell: builds the page once, routes clicks / slider input into the
//! [`Game`], and repaints from a [`SessionView`] on every animation frame when
//! something changed.

use std::cell::RefCell;
use std::fmt::Write as _;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, window};

use crate::audio::ToneGenerator;
use crate::config::GameConfig;
use crate::game::Game;
use crate::level;
use crate::rng::OsRandom;
use crate::timer::{MAX_ROUND_SECS, MIN_ROUND_SECS};
use crate::tone::master_gain;
use crate::view::{self, SessionView, TILT_MAX_DEG, TILT_REST, Tilt};

type BrowserGame = Game<OsRandom, ToneGenerator>;

struct App {
    game: BrowserGame,
    last: Option<SessionView>, // last painted snapshot
}

thread_local! {
    static APP: RefCell<Option<App>> = RefCell::new(None);
}

const ROOT_STYLE: &str = "position:relative; min-height:100vh; width:100%; overflow:hidden; font-family:Vazirmatn, Tahoma, sans-serif; background:linear-gradient(135deg,#fff7ed,#fffbeb,#fff1f2); color:#1f2937;";

const CSS: &str = r#"
#nc-root .nc-wrap{max-width:72rem;margin:0 auto;padding:1.5rem 1rem;display:flex;flex-direction:column;min-height:100vh;}
#nc-root header{display:flex;align-items:center;justify-content:space-between;gap:1rem;flex-wrap:wrap;}
#nc-root .nc-logo{display:inline-flex;width:2.5rem;height:2.5rem;align-items:center;justify-content:center;border-radius:.75rem;background:#f97316;color:#fff;}
#nc-root h1{font-size:1.5rem;font-weight:800;margin:0;}
#nc-root .nc-sub{font-size:.875rem;color:#4b5563;margin:0;}
#nc-root button{cursor:pointer;border:none;box-shadow:0 1px 3px rgba(0,0,0,.15);font-weight:600;}
#nc-root .nc-level{border-radius:9999px;padding:.5rem 1rem;background:rgba(255,255,255,.8);}
#nc-root .nc-level.nc-active{background:#ea580c;color:#fff;}
#nc-root .nc-settings{display:flex;gap:1rem;align-items:center;flex-wrap:wrap;margin-top:1rem;font-size:.875rem;}
#nc-root .nc-panel{border-radius:1rem;background:rgba(255,255,255,.85);padding:1rem;box-shadow:0 10px 25px rgba(0,0,0,.08);}
#nc-root #nc-main{display:none;grid-template-columns:2fr 1fr;gap:1.5rem;margin-top:1.5rem;flex:1;}
#nc-root #nc-intro{display:grid;grid-template-columns:1fr 1fr;gap:2rem;margin-top:3rem;align-items:center;}
#nc-root #nc-city{display:grid;grid-template-columns:repeat(4,1fr);gap:1rem;}
#nc-root .nc-empty{grid-column:1/-1;border:1px dashed #d1d5db;border-radius:.75rem;padding:2rem;text-align:center;color:#6b7280;}
#nc-root .nc-tile{position:relative;display:flex;align-items:flex-end;height:12rem;overflow:hidden;border-radius:.75rem;background:linear-gradient(to top,rgba(0,0,0,.1),transparent);transition:transform .2s;will-change:transform;}
#nc-root .nc-glow{position:absolute;inset:0;pointer-events:none;border-radius:1rem;}
#nc-root .nc-building{margin:0 auto;width:91%;border-radius:.375rem .375rem 0 0;box-shadow:0 10px 15px rgba(0,0,0,.15);}
#nc-root .nc-windows{display:grid;grid-template-columns:repeat(3,1fr);gap:.25rem;padding:.5rem;}
#nc-root .nc-windows span{height:.75rem;border-radius:.125rem;background:rgba(255,255,255,.7);}
#nc-root .nc-badge{position:absolute;left:.5rem;top:.5rem;border-radius:9999px;background:rgba(255,255,255,.9);padding:.125rem .5rem;font-size:.75rem;font-weight:700;}
#nc-root .nc-bar{height:.75rem;width:100%;overflow:hidden;border-radius:9999px;background:#e5e7eb;}
#nc-root .nc-fill{height:100%;border-radius:9999px;background:linear-gradient(to right,#f97316,#ec4899);transition:width .3s;}
#nc-root .nc-fill.nc-clock{background:linear-gradient(to right,#0ea5e9,#6366f1);}
#nc-root #nc-target{font-size:3rem;font-weight:900;}
#nc-root #nc-choices{display:grid;grid-template-columns:repeat(5,1fr);gap:.5rem;margin-top:1rem;}
#nc-root .nc-choice{height:3rem;border-radius:.75rem;background:#fff;}
#nc-root .nc-choice.nc-correct{background:#22c55e;color:#fff;}
#nc-root #nc-banner{margin-top:.75rem;border-radius:.5rem;padding:.5rem;text-align:center;display:none;}
#nc-root #nc-banner.nc-ok{display:block;background:#f0fdf4;color:#15803d;}
#nc-root #nc-banner.nc-bad{display:block;background:#fff1f2;color:#e11d48;}
#nc-root .nc-controls{display:flex;gap:.5rem;}
#nc-root #nc-restart{flex:1;border-radius:.75rem;background:#1f2937;color:#fff;padding:.75rem 1rem;}
#nc-root #nc-next{border-radius:.75rem;background:#fff;padding:.75rem 1rem;}
#nc-root footer{margin-top:2rem;text-align:center;font-size:.75rem;color:#4b5563;}
@keyframes nc-shake{10%,90%{transform:translateX(-1px)}20%,80%{transform:translateX(2px)}30%,50%,70%{transform:translateX(-4px)}40%,60%{transform:translateX(4px)}}
@keyframes nc-float{0%,100%{transform:translateY(0)}50%{transform:translateY(-2px)}}
@keyframes nc-tilt{0%,100%{transform:rotate(0deg)}50%{transform:rotate(-3deg)}}
#nc-root .nc-float{animation:nc-float 3s ease-in-out infinite;}
#nc-root .nc-tilt{animation:nc-tilt 4s ease-in-out infinite;transform-origin:center;}
"#;

/// Static page skeleton; everything dynamic is filled in by `render`.
fn skeleton_html(config: &GameConfig) -> String {
    let mut workers = String::new();
    for lvl in level::levels() {
        let _ = write!(
            workers,
            "<li>{}: شمارش ۱ تا {} ({} کارگر)</li>",
            lvl.label, lvl.answer_range, lvl.workers
        );
    }
    format!(
        r#"<style>{css}</style>
<div class="nc-wrap">
  <header>
    <div style="display:flex;align-items:center;gap:.75rem;">
      <span class="nc-logo">🏗️</span>
      <div><h1>{title}</h1><p class="nc-sub">{subtitle}</p></div>
    </div>
    <div id="nc-levels" style="display:flex;gap:.5rem;"></div>
  </header>
  <div class="nc-settings">
    <label><input type="checkbox" id="nc-timed"{timed}> {timed_label}</label>
    <label><input type="range" id="nc-duration" min="{min}" max="{max}" step="1" value="{secs}"> <span id="nc-duration-label">{secs}</span> ث</label>
    <label><input type="checkbox" id="nc-mute"{muted}> {mute_label}</label>
    <label>🔊 <input type="range" id="nc-volume" min="0" max="1" step="0.05" value="{volume}"></label>
  </div>
  <div id="nc-intro">
    <div class="nc-panel">
      <h2>{intro_heading}</h2>
      <p style="line-height:2rem;">{intro_body}</p>
      <ul>{workers}</ul>
    </div>
    <div class="nc-panel" style="text-align:center;">
      <div style="font-size:4.5rem;">👦🏻👷🏻‍♀️</div>
      <p>{intro_workers}</p>
    </div>
  </div>
  <main id="nc-main">
    <section class="nc-panel">
      <h3>{city_heading}</h3>
      <div id="nc-city"></div>
    </section>
    <section style="display:flex;flex-direction:column;gap:1rem;">
      <div class="nc-panel">
        <div style="display:flex;justify-content:space-between;font-size:.875rem;"><span>{progress}</span><span id="nc-progress-label"></span></div>
        <div class="nc-bar"><div id="nc-progress-fill" class="nc-fill" style="width:0%"></div></div>
        <div id="nc-timer" style="display:none;margin-top:.75rem;">
          <div style="font-size:.875rem;">⏱ <span id="nc-timer-label"></span></div>
          <div class="nc-bar"><div id="nc-timer-fill" class="nc-fill nc-clock" style="width:100%"></div></div>
        </div>
      </div>
      <div id="nc-card" class="nc-panel">
        <div style="font-size:.875rem;color:#4b5563;">{prompt}</div>
        <div style="display:flex;align-items:center;justify-content:space-between;">
          <div id="nc-avatar"></div>
          <div id="nc-target"></div>
        </div>
        <div id="nc-choices"></div>
        <div id="nc-banner"></div>
      </div>
      <div class="nc-controls">
        <button id="nc-restart" data-action="restart">{restart}</button>
        <button id="nc-next" data-action="next">{next}</button>
      </div>
    </section>
  </main>
  <footer>{footer}</footer>
</div>"#,
        css = CSS,
        title = view::TITLE,
        subtitle = view::SUBTITLE,
        timed = if config.timed_mode { " checked" } else { "" },
        timed_label = view::TIMED_LABEL,
        min = MIN_ROUND_SECS,
        max = MAX_ROUND_SECS,
        secs = config.round_seconds,
        muted = if config.muted { " checked" } else { "" },
        mute_label = view::MUTE_LABEL,
        volume = config.volume,
        intro_heading = view::INTRO_HEADING,
        intro_body = view::INTRO_BODY,
        workers = workers,
        intro_workers = view::INTRO_WORKERS,
        city_heading = view::CITY_HEADING,
        progress = view::PROGRESS_LABEL,
        prompt = view::QUESTION_PROMPT,
        restart = view::RESTART_LABEL,
        next = view::NEXT_LABEL,
        footer = view::FOOTER,
    )
}

/// Build the page under `document.body` and start the frame loop.
pub fn mount(config: GameConfig) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    if doc.get_element_by_id("nc-root").is_some() {
        log::warn!("number city already mounted");
        return Ok(());
    }
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;

    let config = config.sanitized();
    let root = doc.create_element("div")?;
    root.set_id("nc-root");
    root.set_attribute("dir", "rtl")?;
    root.set_attribute("style", ROOT_STYLE)?;
    root.set_inner_html(&skeleton_html(&config));
    body.append_child(&root)?;

    let tones = ToneGenerator::new(master_gain(config.volume, config.muted));
    let game = Game::new(config, OsRandom::new(), tones);
    APP.with(|a| a.replace(Some(App { game, last: None })));

    install_click_handler(&root)?;
    install_input_handler(&root)?;
    install_tilt_handlers(&root)?;
    start_frame_loop();
    log::info!("number city mounted");
    Ok(())
}

/// Run `f` against the live game; `false` when nothing is mounted.
pub fn with_game(f: impl FnOnce(&mut BrowserGame)) -> bool {
    APP.with(|cell| match cell.borrow_mut().as_mut() {
        Some(app) => {
            f(&mut app.game);
            true
        }
        None => false,
    })
}

fn event_element(evt: &web_sys::Event, selector: &str) -> Option<Element> {
    evt.target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .and_then(|el| el.closest(selector).ok().flatten())
}

fn install_click_handler(root: &Element) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |evt: web_sys::Event| {
        let Some(el) = event_element(&evt, "[data-action]") else {
            return;
        };
        let action = el.get_attribute("data-action").unwrap_or_default();
        let value = el
            .get_attribute("data-value")
            .and_then(|v| v.parse::<u32>().ok());
        let now = crate::performance_now();
        with_game(|game| match (action.as_str(), value) {
            ("level", Some(id)) => game.select_level(u8::try_from(id).unwrap_or(0), now),
            ("answer", Some(n)) => game.submit_answer(n, now),
            ("restart", _) => game.reset_session(now),
            ("next", _) => game.next_question(now),
            _ => log::debug!("unhandled action {action:?}"),
        });
    }) as Box<dyn FnMut(_)>);
    root.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn install_input_handler(root: &Element) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |evt: web_sys::Event| {
        let Some(input) = evt
            .target()
            .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        let now = crate::performance_now();
        with_game(|game| match input.id().as_str() {
            "nc-timed" => game.set_timed_mode(input.checked(), now),
            "nc-duration" => {
                if let Ok(secs) = input.value().parse::<u32>() {
                    game.set_round_seconds(secs);
                }
            }
            "nc-mute" => game.set_muted(input.checked()),
            "nc-volume" => {
                if let Ok(v) = input.value().parse::<f32>() {
                    game.set_volume(v);
                }
            }
            _ => {}
        });
    }) as Box<dyn FnMut(_)>);
    root.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

fn tile_at(evt: &web_sys::MouseEvent) -> Option<HtmlElement> {
    event_element(evt, "[data-tile]").and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

fn set_glow(tile: &HtmlElement, background: &str) {
    if let Ok(Some(glow)) = tile.query_selector("[data-tilt-glow]") {
        if let Ok(glow) = glow.dyn_into::<HtmlElement>() {
            let _ = glow.style().set_property("background", background);
        }
    }
}

fn install_tilt_handlers(root: &Element) -> Result<(), JsValue> {
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            let Some(tile) = tile_at(&evt) else {
                return;
            };
            let rect = tile.get_bounding_client_rect();
            if rect.width() <= 0.0 || rect.height() <= 0.0 {
                return;
            }
            let tilt = Tilt::at(
                (evt.client_x() as f64 - rect.left()) / rect.width(),
                (evt.client_y() as f64 - rect.top()) / rect.height(),
                TILT_MAX_DEG,
            );
            let _ = tile.style().set_property("transform", &tilt.transform());
            set_glow(&tile, &tilt.glare());
        }) as Box<dyn FnMut(_)>);
        root.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    // mouseleave doesn't bubble; mouseout does, and mousemove re-tilts right away
    // when the pointer only crossed into a child.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            if let Some(tile) = tile_at(&evt) {
                let _ = tile.style().set_property("transform", TILT_REST);
                set_glow(&tile, "transparent");
            }
        }) as Box<dyn FnMut(_)>);
        root.add_event_listener_with_callback("mouseout", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

type FrameCallback = std::rc::Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_frame_loop() {
    let f: FrameCallback = std::rc::Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        frame(ts);
        if let Some(w) = window() {
            if let Some(cb) = f.borrow().as_ref() {
                let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
            }
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(w) = window() {
        if let Some(cb) = g.borrow().as_ref() {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }
}

fn frame(now: f64) {
    APP.with(|cell| {
        let mut slot = cell.borrow_mut();
        let Some(app) = slot.as_mut() else {
            return;
        };
        app.game.tick(now);
        let snapshot = view::project(&app.game);
        if app.last.as_ref() == Some(&snapshot) {
            return;
        }
        if let Some(doc) = window().and_then(|w| w.document()) {
            if let Err(err) = render(&doc, &snapshot, app.last.as_ref()) {
                log::warn!("render failed: {err:?}");
            }
        }
        app.last = Some(snapshot);
    });
}

// --- Painting -----------------------------------------------------------------

fn html_el(doc: &Document, id: &str) -> Option<HtmlElement> {
    doc.get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

fn input_el(doc: &Document, id: &str) -> Option<HtmlInputElement> {
    doc.get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
}

fn set_html(doc: &Document, id: &str, html: &str) {
    if let Some(el) = doc.get_element_by_id(id) {
        el.set_inner_html(html);
    }
}

fn set_text(doc: &Document, id: &str, text: &str) {
    if let Some(el) = doc.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

fn set_style(doc: &Document, id: &str, prop: &str, value: &str) -> Result<(), JsValue> {
    if let Some(el) = html_el(doc, id) {
        el.style().set_property(prop, value)?;
    }
    Ok(())
}

fn levels_html(v: &SessionView) -> String {
    let mut html = String::new();
    for b in &v.levels {
        let _ = write!(
            html,
            "<button class='nc-level{}' data-action='level' data-value='{}'>{}</button>",
            if b.active { " nc-active" } else { "" },
            b.id,
            b.label
        );
    }
    html
}

fn city_html(v: &SessionView) -> String {
    if v.tiles.is_empty() {
        return format!("<div class='nc-empty'>{}</div>", view::EMPTY_CITY);
    }
    let mut html = String::new();
    for t in &v.tiles {
        let _ = write!(
            html,
            "<div class='nc-tile' data-tile='{}'><div class='nc-glow' data-tilt-glow></div>\
             <div class='nc-building' style='background:{};height:{}px'><div class='nc-windows'>",
            t.id, t.color, t.height_px
        );
        for _ in 0..t.windows {
            html.push_str("<span></span>");
        }
        let _ = write!(
            html,
            "</div></div><span class='nc-badge'>{}</span></div>",
            view::TILE_BADGE
        );
    }
    html
}

fn choices_html(v: &SessionView) -> String {
    let mut html = String::new();
    for c in &v.choices {
        let _ = write!(
            html,
            "<button class='nc-choice{}' data-action='answer' data-value='{}'>{}</button>",
            if c.highlighted { " nc-correct" } else { "" },
            c.value,
            c.value
        );
    }
    html
}

/// Repaint the parts of the page whose slice of the view changed.
fn render(doc: &Document, v: &SessionView, last: Option<&SessionView>) -> Result<(), JsValue> {
    let changed = |pick: fn(&SessionView, &SessionView) -> bool| last.is_none_or(|l| pick(l, v));

    if changed(|a, b| a.levels != b.levels) {
        set_html(doc, "nc-levels", &levels_html(v));
    }
    if changed(|a, b| a.playing != b.playing) {
        set_style(doc, "nc-intro", "display", if v.playing { "none" } else { "grid" })?;
        set_style(doc, "nc-main", "display", if v.playing { "grid" } else { "none" })?;
    }
    if changed(|a, b| a.tiles != b.tiles) {
        set_html(doc, "nc-city", &city_html(v));
    }
    if changed(|a, b| a.progress_label != b.progress_label || a.progress != b.progress) {
        set_text(doc, "nc-progress-label", &v.progress_label);
        set_style(doc, "nc-progress-fill", "width", &format!("{:.1}%", v.progress * 100.0))?;
    }
    if changed(|a, b| a.countdown != b.countdown) {
        match v.countdown {
            Some(c) => {
                set_style(doc, "nc-timer", "display", "block")?;
                set_text(doc, "nc-timer-label", &c.remaining_secs.to_string());
                set_style(doc, "nc-timer-fill", "width", &format!("{:.1}%", c.fraction * 100.0))?;
            }
            None => set_style(doc, "nc-timer", "display", "none")?,
        }
    }
    if changed(|a, b| a.target != b.target) {
        set_text(doc, "nc-target", &v.target.to_string());
    }
    if changed(|a, b| a.choices != b.choices) {
        set_html(doc, "nc-choices", &choices_html(v));
    }
    if changed(|a, b| a.mood != b.mood) {
        set_html(doc, "nc-avatar", &view::avatar_svg(v.mood, 56));
    }
    if changed(|a, b| a.banner != b.banner) {
        if let Some(el) = doc.get_element_by_id("nc-banner") {
            el.set_text_content(v.banner);
            let class = match (v.banner, v.shaking) {
                (None, _) => "",
                (Some(_), true) => "nc-bad",
                (Some(_), false) => "nc-ok",
            };
            el.set_class_name(class);
        }
    }
    if v.shaking && changed(|a, b| a.shake_token != b.shake_token) {
        if let Some(card) = html_el(doc, "nc-card") {
            let style = card.style();
            style.set_property("animation", "none")?;
            // reading layout forces a reflow so the animation restarts
            let _ = card.offset_width();
            style.set_property("animation", "nc-shake 0.5s ease-in-out")?;
        }
    }
    if changed(|a, b| a.timed_mode != b.timed_mode) {
        if let Some(i) = input_el(doc, "nc-timed") {
            i.set_checked(v.timed_mode);
        }
    }
    if changed(|a, b| a.round_seconds != b.round_seconds) {
        set_text(doc, "nc-duration-label", &v.round_seconds.to_string());
        if let Some(i) = input_el(doc, "nc-duration") {
            i.set_value(&v.round_seconds.to_string());
        }
    }
    if changed(|a, b| a.muted != b.muted) {
        if let Some(i) = input_el(doc, "nc-mute") {
            i.set_checked(v.muted);
        }
    }
    if changed(|a, b| a.volume != b.volume) {
        if let Some(i) = input_el(doc, "nc-volume") {
            i.set_value(&v.volume.to_string());
        }
    }
    Ok(())
}
