use std::{path::PathBuf, sync::Arc};

use iced::task::Handle;
use iced::widget::{button, column, row, text, text_input};
use iced::{Color, Element, Task};
use tracing::error;
use tracing_subscriber::EnvFilter;

use wiki2vid_core::{
    ApiConfig, Completion, FormController, HttpBackend, Notice, NoticeLevel, RequestTicket, VideoBackend,
    Wiki2VidError, default_download_dir,
};

type Reply<T> = Result<T, Arc<Wiki2VidError>>;

const NO_BACKEND: &str = "backend is not configured";
const MSG_SAVE_BUSY: &str = "Download already in progress";

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    iced::application("wiki2vid", App::update, App::view).run_with(App::new)
}

struct App {
    backend: Option<Arc<HttpBackend>>,
    form: FormController,
    toasts: Vec<Notice>,
    // aborted on reset
    generating: Option<Handle>,
    checking: Option<Handle>,
    saving: Option<Handle>,
}

#[derive(Debug, Clone)]
enum Message {
    UrlChanged(String),
    Generate,
    Generated(RequestTicket, Reply<String>),
    CheckStatus,
    StatusChecked(RequestTicket, Reply<String>),
    Save,
    Saved(Reply<PathBuf>),
    Reset,
    DismissToast(usize),
}

impl App {
    fn new() -> (Self, Task<Message>) {
        let mut toasts = Vec::new();
        let backend = match ApiConfig::from_env().and_then(HttpBackend::new) {
            Ok(backend) => Some(Arc::new(backend)),
            Err(e) => {
                error!(error = %e, "backend configuration failed");
                toasts.push(Notice::error(format!("Configuration error: {}", e)));
                None
            }
        };

        (
            Self {
                backend,
                form: FormController::new(),
                toasts,
                generating: None,
                checking: None,
                saving: None,
            },
            Task::none(),
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        let task = match message {
            Message::UrlChanged(url) => {
                self.form.set_input(url);
                Task::none()
            }
            Message::Generate => self.generate(),
            Message::Generated(ticket, result) => {
                if self.form.finish_generate(&ticket, result) == Completion::Applied {
                    self.generating = None;
                }
                Task::none()
            }
            Message::CheckStatus => self.check_status(),
            Message::StatusChecked(ticket, result) => {
                if self.form.finish_status_check(&ticket, result) == Completion::Applied {
                    self.checking = None;
                }
                Task::none()
            }
            Message::Save => self.save(),
            Message::Saved(result) => {
                self.saving = None;
                match result {
                    Ok(path) => self
                        .toasts
                        .push(Notice::success(format!("Saved to {}", path.display()))),
                    Err(e) => {
                        error!(error = %e, "video download failed");
                        self.toasts.push(Notice::error("Error saving video"));
                    }
                }
                Task::none()
            }
            Message::Reset => {
                for handle in [&mut self.generating, &mut self.checking, &mut self.saving] {
                    if let Some(handle) = handle.take() {
                        handle.abort();
                    }
                }
                self.form.reset();
                Task::none()
            }
            Message::DismissToast(index) => {
                if index < self.toasts.len() {
                    self.toasts.remove(index);
                }
                Task::none()
            }
        };

        self.toasts.extend(self.form.take_notices());
        task
    }

    fn generate(&mut self) -> Task<Message> {
        let Ok(ticket) = self.form.begin_generate() else {
            return Task::none();
        };
        let Some(backend) = self.backend.clone() else {
            self.form.finish_generate(&ticket, Err(NO_BACKEND));
            return Task::none();
        };

        let target = ticket.target.clone();
        let (task, handle) = Task::perform(
            async move { backend.create_video(&target).await.map_err(Arc::new) },
            move |result| Message::Generated(ticket.clone(), result),
        )
        .abortable();
        self.generating = Some(handle);
        task
    }

    fn check_status(&mut self) -> Task<Message> {
        let Ok(ticket) = self.form.begin_status_check() else {
            return Task::none();
        };
        let Some(backend) = self.backend.clone() else {
            self.form.finish_status_check(&ticket, Err(NO_BACKEND));
            return Task::none();
        };

        let target = ticket.target.clone();
        let (task, handle) = Task::perform(
            async move { backend.video_status(&target).await.map_err(Arc::new) },
            move |result| Message::StatusChecked(ticket.clone(), result),
        )
        .abortable();
        self.checking = Some(handle);
        task
    }

    fn save(&mut self) -> Task<Message> {
        if self.saving.is_some() {
            self.toasts.push(Notice::info(MSG_SAVE_BUSY));
            return Task::none();
        }
        let (Some(backend), Some(video_url)) =
            (self.backend.clone(), self.form.state().video_url.clone())
        else {
            return Task::none();
        };

        let dest_dir = default_download_dir();
        let (task, handle) = Task::perform(
            async move {
                backend
                    .download_video(&video_url, &dest_dir)
                    .await
                    .map_err(Arc::new)
            },
            Message::Saved,
        )
        .abortable();
        self.saving = Some(handle);
        task
    }

    fn view(&self) -> Element<'_, Message> {
        let state = self.form.state();

        let video = state.video_url.as_ref().map(|video_url| {
            let shown = self
                .backend
                .as_ref()
                .and_then(|backend| backend.config().resolve_video(video_url).ok())
                .map(|url| url.to_string())
                .unwrap_or_else(|| video_url.clone());

            column![
                text(shown).size(14),
                row![
                    button("Download/Save").on_press(Message::Save),
                    button("Check Status").on_press(Message::CheckStatus),
                ]
                .spacing(10),
            ]
            .push_maybe(state.is_checking_status.then(|| text("Checking status...")))
            .push_maybe(state.status_text.as_deref().map(|status| text(status)))
            .spacing(10)
        });

        let toasts = self
            .toasts
            .iter()
            .enumerate()
            .fold(column![].spacing(5), |col, (index, notice)| {
                let color = match notice.level {
                    NoticeLevel::Success => Color::from_rgb(0.1, 0.6, 0.2),
                    NoticeLevel::Info => Color::from_rgb(0.2, 0.4, 0.8),
                    NoticeLevel::Error => Color::from_rgb(0.8, 0.1, 0.1),
                };
                col.push(
                    row![
                        text(notice.message.as_str()).color(color),
                        button("×").on_press(Message::DismissToast(index)),
                    ]
                    .spacing(10),
                )
            });

        column![
            text("wiki2vid").size(24),
            text("Convert Wikipedia articles into videos effortlessly.").size(14),
            text_input("Enter Wikipedia URL", &state.input_url)
                .on_input(Message::UrlChanged)
                .on_submit(Message::Generate),
            row![
                button("Generate").on_press(Message::Generate),
                button("Reset").on_press(Message::Reset),
            ]
            .spacing(10),
        ]
        .push_maybe(state.is_generating.then(|| text("Processing...")))
        .push_maybe(video)
        .push(toasts)
        .padding(20)
        .spacing(10)
        .into()
    }
}

#[cfg(test)]
mod tests {
    use wiki2vid_core::controller::{MSG_GENERATE_FAILED, MSG_INVALID_URL, MSG_STATUS_FAILED};

    use super::*;

    const CAT: &str = "https://en.wikipedia.org/wiki/Cat";

    fn test_app(backend: Option<HttpBackend>) -> App {
        App {
            backend: backend.map(Arc::new),
            form: FormController::new(),
            toasts: Vec::new(),
            generating: None,
            checking: None,
            saving: None,
        }
    }

    fn messages(app: &App) -> Vec<&str> {
        app.toasts.iter().map(|n| n.message.as_str()).collect()
    }

    fn with_video(app: &mut App) {
        app.form.set_input(CAT);
        let ticket = app.form.begin_generate().unwrap();
        app.form
            .finish_generate::<&str>(&ticket, Ok("/videos/Cat_video.mp4".to_string()));
        app.form.take_notices();
    }

    #[test]
    fn generate_without_backend_still_validates() {
        let mut app = test_app(None);
        let _ = app.update(Message::UrlChanged("not a url".to_string()));
        let _ = app.update(Message::Generate);
        assert_eq!(messages(&app), vec![MSG_INVALID_URL]);
    }

    #[test]
    fn generate_without_backend_reports_failure() {
        let mut app = test_app(None);
        let _ = app.update(Message::UrlChanged(CAT.to_string()));
        let _ = app.update(Message::Generate);

        assert_eq!(messages(&app), vec![MSG_GENERATE_FAILED]);
        assert!(!app.form.state().is_generating);
        assert!(app.generating.is_none());
    }

    #[test]
    fn status_without_backend_reports_failure() {
        let mut app = test_app(None);
        with_video(&mut app);
        let _ = app.update(Message::CheckStatus);

        assert_eq!(messages(&app), vec![MSG_STATUS_FAILED]);
        assert!(!app.form.state().is_checking_status);
    }

    #[test]
    fn second_save_is_ignored_while_downloading() {
        let mut app = test_app(Some(HttpBackend::new(ApiConfig::default()).unwrap()));
        with_video(&mut app);

        let _ = app.update(Message::Save);
        assert!(app.saving.is_some());
        let _ = app.update(Message::Save);

        assert_eq!(messages(&app), vec![MSG_SAVE_BUSY]);
    }

    #[test]
    fn reset_aborts_download_and_allows_new_save() {
        let mut app = test_app(Some(HttpBackend::new(ApiConfig::default()).unwrap()));
        with_video(&mut app);
        let _ = app.update(Message::Save);

        let _ = app.update(Message::Reset);

        assert!(app.saving.is_none());
        assert_eq!(app.form.state(), &wiki2vid_core::FormState::default());
    }
}
