//! Window management using GLFW
//!
//! Opens the viewer window and translates GLFW events into [`AppEvent`]s.

use scene_viewer::{AppEvent, KeyCode, MouseButton};
use thiserror::Error;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW could not be initialised
    #[error("GLFW initialization failed")]
    InitializationFailed,

    /// The window could not be created
    #[error("Window creation failed")]
    CreationFailed,
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// GLFW window wrapper
pub struct Window {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
}

impl Window {
    /// Create a window without a client API context
    pub fn new(title: &str, width: u32, height: u32, resizable: bool) -> WindowResult<Self> {
        let mut glfw = glfw::init(glfw::fail_on_errors).map_err(|_| WindowError::InitializationFailed)?;

        glfw.window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
        glfw.window_hint(glfw::WindowHint::Resizable(resizable));

        let (mut window, events) = glfw
            .create_window(width, height, title, glfw::WindowMode::Windowed)
            .ok_or(WindowError::CreationFailed)?;

        window.set_key_polling(true);
        window.set_close_polling(true);
        window.set_framebuffer_size_polling(true);
        window.set_mouse_button_polling(true);
        window.set_cursor_pos_polling(true);

        Ok(Self { glfw, window, events })
    }

    /// Whether the user asked to close the window
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Mark the window for closing
    pub fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    /// Current framebuffer size in pixels
    pub fn framebuffer_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    /// Poll GLFW and return the translated events
    pub fn poll_events(&mut self) -> Vec<AppEvent> {
        self.glfw.poll_events();
        glfw::flush_messages(&self.events)
            .filter_map(|(_, event)| translate(event))
            .collect()
    }
}

fn translate(event: glfw::WindowEvent) -> Option<AppEvent> {
    match event {
        glfw::WindowEvent::FramebufferSize(width, height) => Some(AppEvent::WindowResized {
            width: width.max(0) as u32,
            height: height.max(0) as u32,
        }),
        glfw::WindowEvent::Close => Some(AppEvent::WindowCloseRequested),
        glfw::WindowEvent::Key(key, _, action, _) => match action {
            glfw::Action::Press => Some(AppEvent::KeyInput {
                key: key_code(key),
                pressed: true,
            }),
            glfw::Action::Release => Some(AppEvent::KeyInput {
                key: key_code(key),
                pressed: false,
            }),
            glfw::Action::Repeat => None,
        },
        glfw::WindowEvent::MouseButton(button, action, _) => {
            let button = match button {
                glfw::MouseButton::Button1 => MouseButton::Left,
                glfw::MouseButton::Button2 => MouseButton::Right,
                glfw::MouseButton::Button3 => MouseButton::Middle,
                _ => return None,
            };
            Some(AppEvent::MouseButton {
                button,
                pressed: action == glfw::Action::Press,
            })
        }
        glfw::WindowEvent::CursorPos(x, y) => Some(AppEvent::MouseMoved { x, y }),
        _ => None,
    }
}

fn key_code(key: glfw::Key) -> KeyCode {
    match key {
        glfw::Key::Space => KeyCode::Space,
        glfw::Key::A => KeyCode::A,
        glfw::Key::R => KeyCode::R,
        glfw::Key::Escape => KeyCode::Escape,
        glfw::Key::Num0 => KeyCode::Digit(0),
        glfw::Key::Num1 => KeyCode::Digit(1),
        glfw::Key::Num2 => KeyCode::Digit(2),
        glfw::Key::Num3 => KeyCode::Digit(3),
        glfw::Key::Num4 => KeyCode::Digit(4),
        glfw::Key::Num5 => KeyCode::Digit(5),
        glfw::Key::Num6 => KeyCode::Digit(6),
        glfw::Key::Num7 => KeyCode::Digit(7),
        glfw::Key::Num8 => KeyCode::Digit(8),
        glfw::Key::Num9 => KeyCode::Digit(9),
        _ => KeyCode::Other,
    }
}
