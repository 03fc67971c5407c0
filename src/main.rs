/// Native demo: draws a menu bar, a combo box and clipped panels through the
/// UI bridge onto a wgpu surface.
#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use scenegui::scene::build_panels;
    use scenegui::{AppConfig, QuadUi};
    use scenegui_gpu::{ClearColor, GpuContext, WgpuEngine};
    use scenegui_ui::{
        Bridge, Combobox, DrawContext, DrawData, DrawResult, ItemId, Menu, Point, Rectangle, Size,
        StyleMetrics,
    };
    use winit::application::ApplicationHandler;
    use winit::event::{ElementState, MouseButton, WindowEvent};
    use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
    use winit::window::{Window, WindowAttributes, WindowId};

    const QUIT: ItemId = ItemId(1);
    const ANIMATE: ItemId = ItemId(2);
    const DARK: ItemId = ItemId(10);
    const BLACK: ItemId = ItemId(11);

    fn build_menu() -> Menu {
        let mut file = Menu::new();
        file.add_item_with_shortcut("Quit", QUIT, "Esc");

        let mut background = Menu::new();
        background.add_item("Dark gray", DARK);
        background.add_item("Black", BLACK);

        let mut view = Menu::new();
        view.add_item("Animate", ANIMATE);
        view.add_separator();
        view.add_menu("Background", background);

        let mut bar = Menu::new();
        bar.add_menu("File", file);
        bar.add_menu("View", view);
        bar.set_checked(ANIMATE, true);
        bar.set_checked(DARK, true);
        bar
    }

    /// Prefer the configured directory; fall back to the one shipped with
    /// the crate when running from elsewhere.
    fn resolve_resource_dir(configured: &Path) -> PathBuf {
        if configured.is_absolute() || configured.exists() {
            return configured.to_path_buf();
        }
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(configured)
    }

    struct AppState {
        window: Arc<Window>,
        bridge: Bridge<WgpuEngine>,
        ui: QuadUi,
        combo: Combobox,
        menu: Menu,
        clear: ClearColor,
        cursor: Point,
        click: Option<Point>,
        scroll: f32,
    }

    impl AppState {
        async fn new(window: Arc<Window>, config: &AppConfig) -> Result<Self, String> {
            let gpu_ctx = GpuContext::new(Arc::clone(&window))
                .await
                .map_err(|e| format!("GPU initialization failed: {e}"))?;
            let mut engine = WgpuEngine::new(gpu_ctx, resolve_resource_dir(&config.resource_dir));
            // QuadUi samples texel (0, 0) only, so a solid atlas keeps vertex colours as-is.
            if let Err(e) = engine.set_font_atlas(&[255; 16], 4, 4) {
                log::warn!("Keeping default font atlas: {e}");
            }
            let mut bridge = Bridge::new(engine, config.bridge);

            let logical = window.inner_size().to_logical::<f32>(window.scale_factor());
            bridge.resize(logical.width as u32, logical.height as u32);

            let mut combo = Combobox::with_items(["Nearest", "Linear", "Cubic"]);
            combo.set_on_value_changed(|value, index| {
                log::info!("Filter changed to {value} ({index})");
            });

            Ok(Self {
                window,
                bridge,
                ui: QuadUi::new(StyleMetrics::default()),
                combo,
                menu: build_menu(),
                clear: config.clear_color(),
                cursor: Point::default(),
                click: None,
                scroll: 0.0,
            })
        }

        fn display_size(&self) -> Size {
            let logical = self
                .window
                .inner_size()
                .to_logical::<f32>(self.window.scale_factor());
            Size::new(logical.width, logical.height)
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.bridge.engine_mut().context_mut().resize(width, height);
            let display = self.display_size();
            self.bridge.resize(display.width as u32, display.height as u32);
        }

        /// Run the widgets for one frame. Returns `false` when the user quit.
        fn update(&mut self) -> (bool, DrawData) {
            let display = self.display_size();
            let scale = self.window.scale_factor() as f32;
            let ctx = DrawContext {
                ui_offset: Point::default(),
                metrics: *self.ui.metrics(),
            };

            self.ui.begin_frame(display, self.click.take());
            let mut keep_running = true;
            match self.menu.draw_menu_bar(&mut self.ui, &ctx, true) {
                Some(QUIT) => keep_running = false,
                Some(ANIMATE) => {
                    let animate = !self.menu.is_checked(ANIMATE);
                    self.menu.set_checked(ANIMATE, animate);
                }
                Some(id @ (DARK | BLACK)) => {
                    self.clear = if id == DARK {
                        ClearColor::DARK_GRAY
                    } else {
                        ClearColor::BLACK
                    };
                    self.menu.set_checked(DARK, id == DARK);
                    self.menu.set_checked(BLACK, id == BLACK);
                }
                Some(other) => log::debug!("Unhandled menu {other}"),
                None => {}
            }

            let bar_height = Menu::calc_height(&ctx.metrics);
            let size = self.combo.preferred_size(&self.ui, &ctx.metrics);
            self.combo.set_frame(Rectangle::new(
                display.width - size.width - 16.0,
                bar_height + 4.0,
                size.width,
                size.height,
            ));
            if self.combo.draw(&mut self.ui, &ctx) == DrawResult::Redraw {
                self.window.request_redraw();
            }
            let widgets = self.ui.end_frame();

            if self.menu.is_checked(ANIMATE) {
                self.scroll += 0.5;
            }
            let panels = build_panels(display, bar_height + size.height + 8.0, self.scroll);

            let mut data = DrawData::new([display.width, display.height], [scale, scale]);
            // Widgets last so their popups composite over the panels.
            data.cmd_lists = vec![panels, widgets];
            (keep_running, data)
        }

        fn render(&mut self) -> Result<bool, wgpu::SurfaceError> {
            let (keep_running, data) = self.update();
            match self.bridge.translate_frame(&data) {
                Ok(stats) if stats.skipped => return Ok(keep_running),
                Ok(_) => {}
                Err(e) => log::error!("Frame dropped: {e}"),
            }
            self.bridge.engine_mut().render_frame(self.clear)?;
            Ok(keep_running)
        }
    }

    struct DemoApp {
        config: AppConfig,
        state: Option<AppState>,
    }

    impl ApplicationHandler for DemoApp {
        fn resumed(&mut self, event_loop: &ActiveEventLoop) {
            if self.state.is_some() {
                return;
            }
            let window_attrs = WindowAttributes::default()
                .with_title(self.config.window.title.clone())
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.config.window.width,
                    self.config.window.height,
                ))
                .with_resizable(self.config.window.resizable);

            let window = match event_loop.create_window(window_attrs) {
                Ok(window) => Arc::new(window),
                Err(e) => {
                    log::error!("Failed to create window: {e}");
                    event_loop.exit();
                    return;
                }
            };

            match pollster::block_on(AppState::new(window, &self.config)) {
                Ok(state) => self.state = Some(state),
                Err(e) => {
                    log::error!("{e}");
                    event_loop.exit();
                }
            }
        }

        fn window_event(
            &mut self,
            event_loop: &ActiveEventLoop,
            _window_id: WindowId,
            event: WindowEvent,
        ) {
            let Some(state) = &mut self.state else {
                return;
            };
            match event {
                WindowEvent::CloseRequested => event_loop.exit(),
                WindowEvent::Resized(size) => state.resize(size.width, size.height),
                WindowEvent::CursorMoved { position, .. } => {
                    let logical = position.to_logical::<f32>(state.window.scale_factor());
                    state.cursor = Point::new(logical.x, logical.y);
                }
                WindowEvent::MouseInput {
                    state: ElementState::Pressed,
                    button: MouseButton::Left,
                    ..
                } => {
                    state.click = Some(state.cursor);
                    state.window.request_redraw();
                }
                WindowEvent::RedrawRequested => match state.render() {
                    Ok(true) => {}
                    Ok(false) => event_loop.exit(),
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let (w, h) = {
                            let ctx = state.bridge.engine().context();
                            (ctx.width(), ctx.height())
                        };
                        state.resize(w, h);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                    Err(e) => log::warn!("Render error: {e:?}"),
                },
                _ => {}
            }
        }

        fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
            if let Some(state) = &self.state {
                state.window.request_redraw();
            }
        }
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let config = AppConfig::load_from_default_path().unwrap_or_default();
        env_logger::Builder::new()
            .filter_level(config.log_level.to_level_filter())
            .parse_default_env()
            .init();
        log::info!("Starting with log level {}", config.log_level.name());

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = DemoApp {
            config,
            state: None,
        };
        event_loop.run_app(&mut app)?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = native::run() {
        eprintln!("Application error: {}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
