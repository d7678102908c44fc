//! Example demonstrating the preference layer
//!
//! This example binds a small settings struct to a durable key, edits it
//! through the store, and round-trips the whole namespace through
//! export/import.

use iced::widget::{button, column, row, scrollable, text, text_input};
use iced::{Element, Length, Subscription, Task};
use iced_prefs::{AppName, ImportCompleted, ImportOptions, PrefStore, Prefs};
use serde::{Deserialize, Serialize};

fn main() -> iced::Result {
    iced::application(App::new, App::update, App::view)
        .subscription(subscription)
        .run()
}

/// User settings persisted under one durable key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct UserSettings {
    theme: String,
    font_size: u32,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            font_size: 14,
        }
    }
}

struct App {
    prefs: Prefs,
    settings: PrefStore<UserSettings>,

    theme_input: String,
    font_size_input: String,
    exported: Option<String>,

    status_message: String,
}

#[derive(Debug, Clone)]
enum Message {
    ThemeInputChanged(String),
    FontSizeInputChanged(String),
    SaveSettings,
    ResetSettings,

    ExportAll,
    ImportAll,
    SettingsSynced(UserSettings),
    Imported(ImportCompleted),
}

impl App {
    fn new() -> (App, Task<Message>) {
        let prefs = Prefs::new(&AppName::new("com", "nrjais", "prefs_demo"));
        let settings = prefs.store_with("user_settings", UserSettings::default);

        let current = settings.get();
        let app = App {
            prefs,
            settings,
            theme_input: current.theme,
            font_size_input: current.font_size.to_string(),
            exported: None,
            status_message: "Ready".to_string(),
        };

        (app, Task::none())
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ThemeInputChanged(value) => {
                self.theme_input = value;
            }

            Message::FontSizeInputChanged(value) => {
                self.font_size_input = value;
            }

            Message::SaveSettings => {
                if let Ok(font_size) = self.font_size_input.parse::<u32>() {
                    self.settings.set(UserSettings {
                        theme: self.theme_input.clone(),
                        font_size,
                    });
                    self.status_message = "Settings saved".to_string();
                } else {
                    self.status_message = "Invalid font size".to_string();
                }
            }

            Message::ResetSettings => {
                self.settings.remove();
                let current = self.settings.get();
                self.theme_input = current.theme;
                self.font_size_input = current.font_size.to_string();
                self.status_message = "Settings reset to defaults".to_string();
            }

            Message::ExportAll => match self.prefs.export_all() {
                Some(document) => {
                    self.status_message = format!("Exported {} bytes", document.len());
                    self.exported = Some(document);
                }
                None => {
                    self.status_message = "Export failed".to_string();
                }
            },

            Message::ImportAll => match &self.exported {
                Some(document) => {
                    if !self
                        .prefs
                        .import_all(document, ImportOptions { merge: false })
                    {
                        self.status_message = "Import failed".to_string();
                    }
                }
                None => {
                    self.status_message = "Nothing exported yet".to_string();
                }
            },

            Message::SettingsSynced(settings) => {
                self.theme_input = settings.theme;
                self.font_size_input = settings.font_size.to_string();
                self.status_message = "Settings synced".to_string();
            }

            Message::Imported(completed) => {
                self.status_message = format!("Imported {} preferences", completed.keys);
            }
        }

        Task::none()
    }

    fn view(&self) -> Element<'_, Message> {
        let title = text("Preference Layer Example").size(32);
        let status = text(format!("Status: {}", self.status_message)).size(14);

        let current = self.settings.get();
        let current_settings = text(format!(
            "Current: theme={}, font_size={}",
            current.theme, current.font_size
        ));

        let theme_input = row![
            text("Theme:").width(100),
            text_input("light, dark, auto", &self.theme_input)
                .on_input(Message::ThemeInputChanged)
                .width(200),
        ]
        .spacing(10);

        let font_size_input = row![
            text("Font Size:").width(100),
            text_input("14", &self.font_size_input)
                .on_input(Message::FontSizeInputChanged)
                .width(200),
        ]
        .spacing(10);

        let buttons = row![
            button("Save").on_press(Message::SaveSettings),
            button("Reset").on_press(Message::ResetSettings),
            button("Export all").on_press(Message::ExportAll),
            button("Import all").on_press(Message::ImportAll),
        ]
        .spacing(10);

        let mut content = column![
            title,
            status,
            current_settings,
            theme_input,
            font_size_input,
            buttons,
        ]
        .spacing(10)
        .padding(20);

        if let Some(document) = &self.exported {
            content = content.push(text(document.clone()).size(12));
        }

        scrollable(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

fn subscription(app: &App) -> Subscription<Message> {
    Subscription::batch([
        app.settings.listen().map(Message::SettingsSynced),
        app.prefs.on_import().map(Message::Imported),
    ])
}
