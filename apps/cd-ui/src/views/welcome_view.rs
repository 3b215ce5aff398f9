use cd_session::SessionConfig;

const INTRO: &str = "Compressor curve digitizer.\n\
Steps: choose image -> calibrate top and bottom chart axes -> pick curve points per IGV -> align -> export CSV.\n\
Calibration clicks go where an axis tick meets the axis, not on a curve.\n\
Keys: B = back one step, Q/Esc = abort.";

pub enum WelcomeAction {
    None,
    Start(SessionConfig, Vec<String>),
    Cancel,
}

/// Startup form: IGV list, sample count and design flow.
pub struct WelcomeView {
    igvs: String,
    num_points: String,
    design_flow: String,
}

impl Default for WelcomeView {
    fn default() -> Self {
        let (igvs, num_points, design_flow) = SessionConfig::default().form_texts();
        Self {
            igvs,
            num_points,
            design_flow,
        }
    }
}

impl WelcomeView {
    pub fn show(&mut self, ui: &mut egui::Ui) -> WelcomeAction {
        let mut action = WelcomeAction::None;
        ui.heading("Compressor Curve Digitizer");
        ui.label(INTRO);
        ui.separator();

        egui::Grid::new("welcome_form")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("IGV list (comma separated):");
                ui.add(egui::TextEdit::singleline(&mut self.igvs).desired_width(260.0));
                ui.end_row();

                ui.label("Sample count (num_points):");
                ui.add(egui::TextEdit::singleline(&mut self.num_points).desired_width(260.0));
                ui.end_row();

                ui.label("Design flow (design_flow):");
                ui.add(egui::TextEdit::singleline(&mut self.design_flow).desired_width(260.0));
                ui.end_row();
            });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui.button("Start").clicked() {
                let (config, advisories) =
                    SessionConfig::from_form(&self.igvs, &self.num_points, &self.design_flow);
                action = WelcomeAction::Start(config, advisories);
            }
            if ui.button("Quit").clicked() {
                action = WelcomeAction::Cancel;
            }
        });
        action
    }
}
