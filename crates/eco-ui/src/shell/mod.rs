use egui::{Context, TopBottomPanel};
use tracing::debug;

/// Application shell that manages the chrome around the dashboard
pub struct AppShell {
    pub config: ShellConfig,
    show_about: bool,
}

/// Shell configuration
pub struct ShellConfig {
    pub show_menu_bar: bool,
    pub show_status_bar: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            show_menu_bar: true,
            show_status_bar: true,
        }
    }
}

/// Actions the hosting app has to carry out after the menu bar ran
#[derive(Debug, Default)]
pub struct ShellResponse {
    pub reset_layout: bool,
}

impl Default for AppShell {
    fn default() -> Self {
        Self::new()
    }
}

impl AppShell {
    pub fn new() -> Self {
        Self {
            config: ShellConfig::default(),
            show_about: false,
        }
    }

    /// Render the main menu bar
    pub fn top_bar(&mut self, ctx: &Context) -> ShellResponse {
        let mut response = ShellResponse::default();
        if !self.config.show_menu_bar {
            return response;
        }

        TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Exit").clicked() {
                        ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.config.show_status_bar, "Status Bar");
                    ui.separator();
                    if ui.button("Reset Layout").clicked() {
                        debug!("layout reset requested");
                        response.reset_layout = true;
                        ui.close_menu();
                    }
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        self.show_about = true;
                        ui.close_menu();
                    }
                });
            });
        });

        if self.show_about {
            self.about_window(ctx);
        }
        response
    }

    fn about_window(&mut self, ctx: &Context) {
        let mut open = self.show_about;
        egui::Window::new("About")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.heading("Environmental Data Dashboard");
                ui.label(format!("Version {}", env!("CARGO_PKG_VERSION")));
                ui.add_space(8.0);
                ui.label("Linked views of population growth, risk scores and environmental measures.");
            });
        self.show_about = open;
    }

    /// Render the bottom status bar with the current selection and frame stats
    pub fn status_bar(&self, ctx: &Context, selection: &str, frame: Option<(f32, f32)>) {
        if !self.config.show_status_bar {
            return;
        }

        TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Selected:");
                ui.label(egui::RichText::new(selection).strong());

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some((avg_ms, max_ms)) = frame {
                        let text = format!("{avg_ms:.1} ms avg / {max_ms:.1} ms max");
                        if avg_ms > 33.0 {
                            ui.colored_label(crate::theme::warning_color(), text);
                        } else {
                            ui.label(text);
                        }
                    }
                });
            });
        });
    }
}
