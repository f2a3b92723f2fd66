//! Pixel Rally entry point
//!
//! Handles browser initialization and runs the overlay loop: one simulation
//! tick, one render, and two probe broadcasts per display frame.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement, MouseEvent};

    use pixel_rally::bus::{CollisionBus, Probe, Subscription};
    use pixel_rally::consts::*;
    use pixel_rally::post::PostChain;
    use pixel_rally::renderer::OverlayRenderState;
    use pixel_rally::sim::collision::Rect;
    use pixel_rally::sim::{control, tick, ControlMode, ControlState, SimState};
    use pixel_rally::targets::{BoxCollider, LetterSpacing, TextCollider};
    use pixel_rally::theme::{builtin_themes, theme_index, Color, ColorTheme};
    use pixel_rally::Settings;

    /// Blink-stop sweep cadence in frames (~500ms at 60Hz)
    const BLINK_SWEEP_FRAMES: u64 = 30;
    /// Pixel size of the title text target
    const TITLE_PIXEL_SIZE: f32 = 7.0;

    /// Application state behind the shared cell
    struct App {
        sim: SimState,
        control: ControlState,
        settings: Settings,
        themes: Vec<ColorTheme>,
        theme_index: usize,
        render_state: Option<OverlayRenderState>,
        post: Option<PostChain>,
        frame: u64,
    }

    impl App {
        fn theme(&self) -> &ColorTheme {
            &self.themes[self.theme_index]
        }
    }

    /// Theme colors the collision targets read at probe time
    struct SharedTheme {
        base: Color,
        palette: Vec<Color>,
    }

    /// A mounted pixel-text element and its collision state
    struct TextTarget {
        collider: TextCollider,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        dirty: bool,
    }

    impl TextTarget {
        fn draw(&mut self, base: Color) {
            let size = self.collider.size();
            self.ctx.clear_rect(0.0, 0.0, size.x as f64, size.y as f64);
            for cell in self.collider.cells() {
                let color = self.collider.render_color(cell.char_index, base);
                self.ctx.set_fill_style_str(&color.to_css());
                self.ctx.fill_rect(
                    cell.x as f64,
                    cell.y as f64,
                    cell.size as f64,
                    cell.size as f64,
                );
            }
            self.dirty = false;
        }
    }

    /// A mounted box element and its pulse state
    struct BoxTarget {
        collider: BoxCollider,
        element: Element,
    }

    /// Everything the frame loop and listeners share
    #[derive(Clone)]
    struct Handles {
        app: Rc<RefCell<App>>,
        bus: CollisionBus,
        text: Option<Rc<RefCell<TextTarget>>>,
        boxes: Rc<RefCell<Vec<BoxTarget>>>,
        shared_theme: Rc<RefCell<SharedTheme>>,
        /// Keeps the target subscriptions alive for the page lifetime
        _subs: Rc<Vec<Subscription>>,
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Pixel Rally starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("overlay")
            .expect("no overlay canvas")
            .dyn_into()
            .expect("not a canvas");

        // Size the surface to the full viewport in device pixels (DPR capped)
        let dpr = window.device_pixel_ratio().min(MAX_DPR);
        let css_w = window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(800.0);
        let css_h = window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(600.0);
        let width = (css_w * dpr) as u32;
        let height = (css_h * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load();
        let themes = builtin_themes();
        let current_theme = theme_index(&themes, &settings.theme).unwrap_or(0);

        let viewport = Vec2::new(css_w as f32, css_h as f32);
        let seed = js_sys::Date::now() as u64;
        let mut sim = SimState::new(viewport, seed);
        let mut ctrl = ControlState::new(viewport);
        if settings.pointer_mode {
            control::set_mode(&mut sim, &mut ctrl, ControlMode::Pointer);
        }

        log::info!("Simulation initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state =
            OverlayRenderState::new(surface, &adapter, width, height, dpr as f32).await;

        // No paper asset is wired up, so the chain runs degraded
        // (tensor + kuwahara) whenever the stylized toggle is on.
        let post = settings.stylized.then(|| {
            PostChain::new(
                &render_state.device,
                &render_state.queue,
                render_state.format(),
                width,
                height,
                settings.kuwahara_radius,
                None,
            )
        });

        let shared_theme = Rc::new(RefCell::new(SharedTheme {
            base: themes[current_theme].text,
            palette: themes[current_theme].hit_colors.clone(),
        }));
        apply_theme_vars(&document, &themes[current_theme]);

        let app = Rc::new(RefCell::new(App {
            sim,
            control: ctrl,
            settings,
            themes,
            theme_index: current_theme,
            render_state: Some(render_state),
            post,
            frame: 0,
        }));

        // Mount collision targets and subscribe them to the bus
        let bus = CollisionBus::new();
        let mut subs = Vec::new();

        let text = mount_text_target(&document, &shared_theme);
        if let Some(text) = &text {
            let text = text.clone();
            let shared = shared_theme.clone();
            subs.push(bus.subscribe(move |probe| {
                if let Probe::Point { pos } = probe {
                    let mut target = text.borrow_mut();
                    // Origin re-read every probe; the page may have scrolled
                    let rect = target.canvas.get_bounding_client_rect();
                    let origin = Vec2::new(rect.left() as f32, rect.top() as f32);
                    let shared = shared.borrow();
                    if target
                        .collider
                        .probe_point(*pos, origin, &shared.palette, js_sys::Date::now())
                        .is_some()
                    {
                        target.dirty = true;
                    }
                }
            }));
        }

        let boxes = mount_box_targets(&document);
        {
            let boxes = boxes.clone();
            subs.push(bus.subscribe(move |probe| {
                if let Probe::Circle { pos, radius } = probe {
                    let now = js_sys::Date::now();
                    for target in boxes.borrow_mut().iter_mut() {
                        let rect = target.element.get_bounding_client_rect();
                        let bounds = Rect::new(
                            rect.left() as f32,
                            rect.top() as f32,
                            rect.width() as f32,
                            rect.height() as f32,
                        );
                        target.collider.probe_circle(*pos, *radius, &bounds, now);
                    }
                }
            }));
        }

        let handles = Handles {
            app,
            bus,
            text,
            boxes,
            shared_theme,
            _subs: Rc::new(subs),
        };

        setup_input_handlers(&handles);
        setup_control_buttons(&handles);

        // Start the frame loop
        request_animation_frame(handles);

        log::info!("Pixel Rally running!");
    }

    fn mount_text_target(
        document: &web_sys::Document,
        shared_theme: &Rc<RefCell<SharedTheme>>,
    ) -> Option<Rc<RefCell<TextTarget>>> {
        let canvas: HtmlCanvasElement = document.get_element_by_id("pixel-title")?.dyn_into().ok()?;
        let text = canvas
            .get_attribute("data-text")
            .unwrap_or_else(|| "HELLO WORLD".to_string());

        let collider = TextCollider::new(
            &text,
            TITLE_PIXEL_SIZE,
            LetterSpacing::Wide,
            None,
            js_sys::Date::now() as u64,
        );
        let size = collider.size();
        canvas.set_width(size.x.ceil() as u32);
        canvas.set_height(size.y.ceil() as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into()
            .ok()?;

        let mut target = TextTarget {
            collider,
            canvas,
            ctx,
            dirty: false,
        };
        target.draw(shared_theme.borrow().base);
        log::info!("text target mounted: {:?}", text);
        Some(Rc::new(RefCell::new(target)))
    }

    fn mount_box_targets(document: &web_sys::Document) -> Rc<RefCell<Vec<BoxTarget>>> {
        let mut targets = Vec::new();
        if let Ok(nodes) = document.query_selector_all(".pixel-box") {
            for i in 0..nodes.length() {
                if let Some(node) = nodes.item(i) {
                    if let Ok(element) = node.dyn_into::<Element>() {
                        targets.push(BoxTarget {
                            collider: BoxCollider::new(),
                            element,
                        });
                    }
                }
            }
        }
        log::info!("{} box targets mounted", targets.len());
        Rc::new(RefCell::new(targets))
    }

    fn apply_theme_vars(document: &web_sys::Document, theme: &ColorTheme) {
        if let Some(root) = document.document_element() {
            let style = format!(
                "--theme-background: {}; --theme-text: {}; --theme-box-bg: {}; \
                 --theme-box-border: {}; --theme-paddle: {}; --theme-ball: {};",
                theme.background.to_css(),
                theme.text.to_css(),
                theme.box_background.to_css(),
                theme.box_border.to_css(),
                theme.paddle.to_css(),
                theme.ball.to_css(),
            );
            let _ = root.set_attribute("style", &style);
        }
    }

    fn setup_input_handlers(handles: &Handles) {
        let window = web_sys::window().unwrap();

        // Pointer position feeds the control state; the next tick reads it
        {
            let app = handles.app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                app.borrow_mut().control.pointer =
                    Vec2::new(event.client_x() as f32, event.client_y() as f32);
            });
            let _ = window
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize: paddles re-anchor and both render paths update their
        // resolution state before the next frame
        {
            let app = handles.app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let window = web_sys::window().unwrap();
                let document = window.document().unwrap();
                let dpr = window.device_pixel_ratio().min(MAX_DPR);
                let css_w = window
                    .inner_width()
                    .ok()
                    .and_then(|v| v.as_f64())
                    .unwrap_or(800.0);
                let css_h = window
                    .inner_height()
                    .ok()
                    .and_then(|v| v.as_f64())
                    .unwrap_or(600.0);
                let width = (css_w * dpr) as u32;
                let height = (css_h * dpr) as u32;

                if let Some(canvas) = document.get_element_by_id("overlay") {
                    if let Ok(canvas) = canvas.dyn_into::<HtmlCanvasElement>() {
                        canvas.set_width(width);
                        canvas.set_height(height);
                    }
                }

                let mut app = app.borrow_mut();
                app.sim.resize(Vec2::new(css_w as f32, css_h as f32));
                if let Some(render_state) = &mut app.render_state {
                    render_state.resize(width, height, dpr as f32);
                }
                if let Some(chain) = &mut app.post {
                    chain.resize(width, height);
                }
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_control_buttons(handles: &Handles) {
        let document = web_sys::window().unwrap().document().unwrap();

        // Mode toggle (autonomous <-> pointer-driven)
        if let Some(button) = document.get_element_by_id("mode-toggle") {
            let app = handles.app.clone();
            let button_el = button.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut app = app.borrow_mut();
                let next = if app.control.mode == ControlMode::Pointer {
                    ControlMode::Autonomous
                } else {
                    ControlMode::Pointer
                };
                let App {
                    sim,
                    control: ctrl,
                    settings,
                    ..
                } = &mut *app;
                control::set_mode(sim, ctrl, next);
                settings.pointer_mode = next == ControlMode::Pointer;
                settings.save();
                button_el.set_text_content(Some(if settings.pointer_mode {
                    "MANUAL"
                } else {
                    "AUTO"
                }));
            });
            let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Theme cycle
        if let Some(button) = document.get_element_by_id("theme-toggle") {
            let app = handles.app.clone();
            let shared_theme = handles.shared_theme.clone();
            let text = handles.text.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let document = web_sys::window().unwrap().document().unwrap();
                let mut app = app.borrow_mut();
                app.theme_index = (app.theme_index + 1) % app.themes.len();
                let theme = app.theme().clone();
                app.settings.theme = theme.name.to_string();
                app.settings.save();
                drop(app);

                apply_theme_vars(&document, &theme);
                let mut shared = shared_theme.borrow_mut();
                shared.base = theme.text;
                shared.palette = theme.hit_colors.clone();
                drop(shared);

                if let Some(text) = &text {
                    text.borrow_mut().dirty = true;
                }
                log::info!("theme -> {}", theme.name);
            });
            let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Watercolor render toggle: the chain is built on demand and
        // disposed when switched off
        if let Some(button) = document.get_element_by_id("style-toggle") {
            let app = handles.app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut app = app.borrow_mut();
                app.settings.stylized = !app.settings.stylized;
                if app.settings.stylized {
                    let App {
                        render_state,
                        post,
                        settings,
                        ..
                    } = &mut *app;
                    if let Some(render_state) = render_state {
                        *post = Some(PostChain::new(
                            &render_state.device,
                            &render_state.queue,
                            render_state.format(),
                            render_state.size.0,
                            render_state.size.1,
                            settings.kuwahara_radius,
                            None,
                        ));
                    }
                } else if let Some(mut chain) = app.post.take() {
                    chain.dispose();
                }
                app.settings.save();
            });
            let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(handles: Handles) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            frame(handles, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame(handles: Handles, _time: f64) {
        // Tick and render under one borrow; probes go out after it drops so
        // target listeners can take their own borrows.
        let (probes, frame_no) = {
            let mut app = handles.app.borrow_mut();

            if app.render_state.is_none() {
                // Surface not ready: skip the tick, keep the loop alive
                drop(app);
                request_animation_frame(handles);
                return;
            }

            app.frame += 1;
            let frame_no = app.frame;

            let ctrl = app.control;
            let probes = tick(&mut app.sim, &ctrl);

            let App {
                sim,
                control: ctrl,
                settings,
                themes,
                theme_index,
                render_state,
                post,
                ..
            } = &mut *app;
            let theme = &themes[*theme_index];
            if let Some(render_state) = render_state {
                let chain = if settings.stylized { post.as_mut() } else { None };
                match render_state.render(sim, ctrl, theme, chain) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        let (w, h) = render_state.size;
                        let scale = render_state.scale;
                        render_state.resize(w, h, scale);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }

            (probes, frame_no)
        };

        // Broadcast strictly after this tick's state update and draw
        for probe in &probes {
            handles.bus.publish(probe);
        }

        update_speed_hud(&handles);

        // Text target animation: advance blink phases each frame, sweep the
        // five-second blink-stop rule periodically
        if let Some(text) = &handles.text {
            let mut text = text.borrow_mut();
            if text.collider.advance_blink() {
                text.dirty = true;
            }
            if frame_no % BLINK_SWEEP_FRAMES == 0 {
                text.collider.sweep_blink(js_sys::Date::now());
            }
            if text.dirty {
                let base = handles.shared_theme.borrow().base;
                text.draw(base);
            }
        }

        // Box pulse styling
        let now = js_sys::Date::now();
        for target in handles.boxes.borrow_mut().iter_mut() {
            if target.collider.is_pulsing(now) {
                let scale = target.collider.scale(now);
                let _ = target
                    .element
                    .set_attribute("style", &format!("transform: scale({:.3});", scale));
            } else {
                let _ = target.element.remove_attribute("style");
            }
        }

        request_animation_frame(handles);
    }

    fn update_speed_hud(handles: &Handles) {
        let app = handles.app.borrow();
        let document = web_sys::window().unwrap().document().unwrap();

        let visible = app.control.mode == ControlMode::Pointer && app.settings.show_speed;
        if let Some(el) = document.get_element_by_id("speed-indicator") {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
        if !visible {
            return;
        }

        let level = app.sim.ball.speed_level;
        let max = app.sim.speed_cfg.max_level;

        if let Some(el) = document.get_element_by_id("speed-level") {
            el.set_text_content(Some(&level.to_string()));
        }
        if let Some(el) = document.get_element_by_id("speed-max") {
            el.set_text_content(Some(&format!("/ {}", max)));
        }
        if let Some(el) = document.get_element_by_id("speed-bar") {
            let pct = level as f32 / max.max(1) as f32 * 100.0;
            let _ = el.set_attribute(
                "style",
                &format!(
                    "width: {:.0}%; background-color: {};",
                    pct,
                    speed_color(level, max)
                ),
            );
        }
    }

    /// Speed bar color ramps green -> red with the level
    fn speed_color(level: u32, max: u32) -> &'static str {
        let fraction = level as f32 / max.max(1) as f32;
        if fraction <= 0.3 {
            "#4ade80"
        } else if fraction <= 0.6 {
            "#facc15"
        } else if fraction <= 0.9 {
            "#fb923c"
        } else {
            "#ef4444"
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Pixel Rally (native) starting...");
    log::info!("The overlay is web-only - run with `trunk serve` for the browser version");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
