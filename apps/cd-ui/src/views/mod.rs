pub mod canvas_view;
pub mod number_prompt;
pub mod welcome_view;

pub use canvas_view::{CanvasView, pressed_keys};
pub use number_prompt::NumberPrompt;
pub use welcome_view::{WelcomeAction, WelcomeView};
