use pawsphere::cli::Args;
use pawsphere::config::{self, GalleryConfig};
use pawsphere::core::card::{self, CardModel};
use pawsphere::core::event_bus::EventBus;
use pawsphere::core::events::{GalleryEvent, ViewMode};
use pawsphere::core::workers::Workers;
use pawsphere::render::renderer::CardRenderer;
use pawsphere::shell::GalleryShell;
use pawsphere::ui;

use clap::Parser;
use eframe::{egui, glow};
use log::{debug, info, warn};
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex};

/// Detail overlay state: a pinned clone of the selected card.
///
/// Pinning means a resample behind the overlay never swaps its content;
/// closing it returns to whatever the live display set shows.
struct DetailOverlay {
    card: CardModel,
    photo_index: usize,
}

/// Main application state
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
struct PawsphereApp {
    view_mode: ViewMode,
    #[serde(skip)]
    shell: GalleryShell,
    #[serde(skip)]
    renderer: Arc<Mutex<CardRenderer>>,
    #[serde(skip)]
    workers: Arc<Workers>,
    #[serde(skip)]
    epoch: Arc<AtomicU64>,
    #[serde(skip)]
    event_bus: EventBus,
    #[serde(skip)]
    overlay: Option<DetailOverlay>,
    #[serde(skip)]
    is_fullscreen: bool,
}

impl Default for PawsphereApp {
    fn default() -> Self {
        let epoch = Arc::new(AtomicU64::new(0));
        let num_workers = (num_cpus::get() / 2).max(1);
        let workers = Arc::new(Workers::new(num_workers, Arc::clone(&epoch)));
        let event_bus = EventBus::new();
        let shell = GalleryShell::new(
            &GalleryConfig::default(),
            Arc::clone(&workers),
            Arc::clone(&epoch),
            event_bus.emitter(),
        );

        Self {
            view_mode: ViewMode::Sphere,
            shell,
            renderer: Arc::new(Mutex::new(CardRenderer::new())),
            workers,
            epoch,
            event_bus,
            overlay: None,
            is_fullscreen: false,
        }
    }
}

impl PawsphereApp {
    /// Rebuild the runtime pieces lost during deserialization with the
    /// resolved configuration.
    fn rebuild_runtime(&mut self, config: &GalleryConfig) {
        self.shell = GalleryShell::new(
            config,
            Arc::clone(&self.workers),
            Arc::clone(&self.epoch),
            self.event_bus.emitter(),
        );
        self.shell.set_view_mode(self.view_mode);
    }

    /// Handle events from the event bus.
    fn handle_events(&mut self) {
        for event in self.event_bus.poll() {
            match event {
                GalleryEvent::CardSelected(card) => {
                    info!("Opening detail overlay for card {}", card.id);
                    self.overlay = Some(DetailOverlay {
                        card,
                        photo_index: 0,
                    });
                }
                GalleryEvent::ViewModeChanged(mode) => {
                    info!("View mode changed: {}", mode.as_str());
                    self.view_mode = mode;
                }
                GalleryEvent::DisplaySetReplaced {
                    generation,
                    real_cards,
                    filler_cards,
                } => {
                    debug!(
                        "Display set generation {generation}: {real_cards} real + {filler_cards} filler"
                    );
                }
            }
        }
    }

    fn handle_keyboard_input(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }

        // ESC/Q priority cascade: overlay -> fullscreen -> quit.
        if ctx.input(|i| i.key_pressed(egui::Key::Escape) || i.key_pressed(egui::Key::Q)) {
            if self.overlay.is_some() {
                self.overlay = None;
            } else if self.is_fullscreen {
                self.set_fullscreen(ctx, false);
            } else {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            return;
        }

        // Tab flips between the two renderers.
        if ctx.input(|i| i.key_pressed(egui::Key::Tab)) {
            let next = match self.shell.view_mode() {
                ViewMode::Sphere => ViewMode::Album,
                ViewMode::Album => ViewMode::Sphere,
            };
            self.shell.set_view_mode(next);
        }
    }

    fn set_fullscreen(&mut self, ctx: &egui::Context, enabled: bool) {
        self.is_fullscreen = enabled;
        ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(enabled));
        ctx.request_repaint();
    }

    fn render_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("mode_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("pawsphere").strong());
                ui.separator();
                let mode = self.shell.view_mode();
                if ui.selectable_label(mode == ViewMode::Sphere, "Sphere").clicked() {
                    self.shell.set_view_mode(ViewMode::Sphere);
                }
                if ui.selectable_label(mode == ViewMode::Album, "Album").clicked() {
                    self.shell.set_view_mode(ViewMode::Album);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new("Tab: switch view | Esc: quit")
                            .weak()
                            .small(),
                    );
                });
            });
        });
    }

    fn render_detail_overlay(&mut self, ctx: &egui::Context) {
        let Some(overlay) = &mut self.overlay else {
            return;
        };

        let mut open = true;
        egui::Window::new(&overlay.card.title)
            .id(egui::Id::new("detail_overlay"))
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                let card = &overlay.card;
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(&card.date_label).strong());
                    if !card.location_label.is_empty() {
                        ui.separator();
                        ui.label(&card.location_label);
                    }
                    if !card.weather_label.is_empty() {
                        ui.separator();
                        ui.label(&card.weather_label);
                    }
                });
                ui.separator();
                ui.label(&card.content_text);

                // Photo pagination for multi-photo entries; the overlay owns
                // its page index independently of the gallery.
                if card.photos.len() > 1 {
                    ui.separator();
                    ui.horizontal(|ui| {
                        if ui.button("<").clicked() && overlay.photo_index > 0 {
                            overlay.photo_index -= 1;
                        }
                        ui.label(format!(
                            "photo {} / {}",
                            overlay.photo_index + 1,
                            card.photos.len()
                        ));
                        if ui.button(">").clicked()
                            && overlay.photo_index + 1 < card.photos.len()
                        {
                            overlay.photo_index += 1;
                        }
                    });
                    ui.label(
                        egui::RichText::new(&card.photos[overlay.photo_index])
                            .weak()
                            .small(),
                    );
                }
            });

        if !open {
            self.overlay = None;
        }
    }
}

impl eframe::App for PawsphereApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Advance the engine: resample timer, decode intake, orbit easing.
        let now = ctx.input(|i| i.time);
        self.shell.tick(now);

        self.handle_events();

        if !self.is_fullscreen {
            self.render_top_panel(ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui::render(ui, &mut self.shell, &self.renderer);
        });

        self.render_detail_overlay(ctx);

        // Process keyboard input after hover states were updated by panel rendering
        self.handle_keyboard_input(ctx);
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.view_mode = self.shell.view_mode();
        if let Ok(json) = serde_json::to_string(self) {
            storage.set_string(eframe::APP_KEY, json);
            debug!("App state saved: view mode {}", self.view_mode.as_str());
        }
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        self.shell.teardown();
        if let Some(gl) = gl {
            let mut renderer = self.renderer.lock().unwrap();
            renderer.destroy(gl);
            debug!("CardRenderer resources cleaned up");
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments first (needed for log setup)
    let args = Args::parse();
    let config = GalleryConfig::from_env_and_cli(&args);

    if let Err(e) = config::ensure_dirs(&config) {
        eprintln!("Warning: Failed to create application directories: {e}");
    }

    // Determine log level based on verbosity flags
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    // Initialize logger based on --log flag
    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .as_ref()
            .cloned()
            .unwrap_or_else(|| config::config_file("pawsphere.log", &config));

        let file = std::fs::File::create(&log_path)?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!(
            "Logging to file: {} (level: {:?})",
            log_path.display(),
            log_level
        );
    } else {
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
            .format_timestamp_millis()
            .init();
    }

    info!("Pawsphere gallery starting...");
    debug!("Command-line args: {args:?}");
    info!(
        "Config path: {}",
        config::config_file("pawsphere.json", &config).display()
    );

    // Host stand-in for the diary fetch: any failure degrades to an empty
    // source and an all-placeholder gallery, never a startup error.
    let source: Vec<CardModel> = match &config.diary_path {
        Some(path) => match card::read_diary_list(path) {
            Ok(entries) => {
                info!("Loaded {} diary entries from {}", entries.len(), path.display());
                entries.iter().map(CardModel::from_entry).collect()
            }
            Err(e) => {
                warn!("Diary list unavailable, showing placeholders: {e:#}");
                Vec::new()
            }
        },
        None => {
            info!("No diary file provided, starting with placeholders");
            Vec::new()
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("Pawsphere v{}", env!("CARGO_PKG_VERSION")))
            .with_inner_size(egui::vec2(1100.0, 760.0))
            .with_resizable(true),
        persist_window: true,
        #[cfg(not(target_arch = "wasm32"))]
        persistence_path: Some(config::config_file("pawsphere.json", &config)),
        ..Default::default()
    };

    eframe::run_native(
        "Pawsphere",
        native_options,
        Box::new(move |cc| {
            // Load persisted app state if available, otherwise create default
            let mut app: PawsphereApp = cc
                .storage
                .and_then(|storage| storage.get_string(eframe::APP_KEY))
                .and_then(|json| serde_json::from_str(&json).ok())
                .unwrap_or_else(|| {
                    info!("No persisted state found, creating default app");
                    PawsphereApp::default()
                });

            app.rebuild_runtime(&config);
            app.shell.set_source_collection(source, 0.0);

            if config.fullscreen {
                app.set_fullscreen(&cc.egui_ctx, true);
            }

            Ok(Box::new(app))
        }),
    )?;

    info!("Application exiting");
    Ok(())
}
