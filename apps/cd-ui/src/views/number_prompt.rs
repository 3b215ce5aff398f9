/// Modal window asking for one numeric value; the session thread validates the text.
pub struct NumberPrompt {
    title: String,
    prompt: String,
    text: String,
    focus_pending: bool,
}

impl NumberPrompt {
    pub fn new(title: String, prompt: String, initial: String) -> Self {
        Self {
            title,
            prompt,
            text: initial,
            focus_pending: true,
        }
    }

    /// `Some(reply)` once the user confirms (`Some(text)`) or dismisses (`None`).
    pub fn show(&mut self, ctx: &egui::Context) -> Option<Option<String>> {
        let mut reply = None;
        egui::Window::new(&self.title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&self.prompt);
                let edit = ui.text_edit_singleline(&mut self.text);
                if self.focus_pending {
                    edit.request_focus();
                    self.focus_pending = false;
                }
                let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() || submitted {
                        reply = Some(Some(self.text.clone()));
                    }
                    if ui.button("Cancel").clicked() {
                        reply = Some(None);
                    }
                });
            });
        reply
    }
}
