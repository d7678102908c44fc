//! Stream dashboard
//!
//! Follow games from the IGDB catalog and list the currently live Twitch
//! streams for them, with per-user tag and broadcaster filters. Everything
//! beyond the remote catalog/stream data lives in the local preference
//! namespace, so the followed games and blacklists survive restarts and can
//! be exported/imported as one document.

mod api;
mod types;

use api::ApiConfig;
use iced::widget::{button, column, row, scrollable, text, text_input};
use iced::{Element, Length, Subscription, Task};
use iced_prefs::{AppName, ImportCompleted, ImportOptions, PrefStore, Prefs};
use types::{GameOption, Stream};

/// Durable keys, shared with exported preference documents
const FOLLOWED_GAMES_KEY: &str = "followedGames";
const BLACKLISTED_TAGS_KEY: &str = "blacklistedTags";
const BLACKLISTED_USERS_KEY: &str = "blacklistedUsers";

const EXPORT_FILENAME: &str = "stream_dashboard_prefs.json";

fn main() -> iced::Result {
    iced::application(Dashboard::new, Dashboard::update, Dashboard::view)
        .subscription(subscription)
        .run()
}

struct Dashboard {
    prefs: Prefs,
    followed: PrefStore<Vec<GameOption>>,
    blacklisted_tags: PrefStore<Vec<String>>,
    blacklisted_users: PrefStore<Vec<String>>,

    api: Option<ApiConfig>,
    token: Option<String>,

    search_open: bool,
    search_term: String,
    search_results: Vec<GameOption>,

    streams: Vec<Stream>,
    import_path: String,
    status: String,
}

#[derive(Debug, Clone)]
enum Message {
    TokenFetched(Result<String, String>),

    ToggleSearch,
    SearchTermChanged(String),
    Search,
    SearchResults(Result<Vec<GameOption>, String>),
    ToggleFollow(GameOption),

    FetchStreams,
    StreamsFetched(Result<Vec<Stream>, String>),
    ToggleTagBlacklist(String),
    ToggleUserBlacklist(String),

    ExportPrefs,
    ImportPathChanged(String),
    ImportPrefs { merge: bool },

    FollowedSynced(Vec<GameOption>),
    BlacklistedTagsSynced(Vec<String>),
    BlacklistedUsersSynced(Vec<String>),
    PrefsImported(ImportCompleted),
}

impl Dashboard {
    fn new() -> (Self, Task<Message>) {
        let prefs = Prefs::new(&AppName::new("com", "nrjais", "stream_dashboard"));
        let followed = prefs.store(FOLLOWED_GAMES_KEY, Vec::new());
        let blacklisted_tags = prefs.store(BLACKLISTED_TAGS_KEY, Vec::new());
        let blacklisted_users = prefs.store(BLACKLISTED_USERS_KEY, Vec::new());

        let (api, status) = match ApiConfig::from_env() {
            Ok(config) => (Some(config), "Fetching auth token...".to_string()),
            Err(e) => (None, e),
        };

        let token_task = match &api {
            Some(config) => Task::perform(api::fetch_token(config.clone()), Message::TokenFetched),
            None => Task::none(),
        };

        let dashboard = Dashboard {
            prefs,
            followed,
            blacklisted_tags,
            blacklisted_users,
            api,
            token: None,
            search_open: false,
            search_term: String::new(),
            search_results: Vec::new(),
            streams: Vec::new(),
            import_path: String::new(),
            status,
        };

        (dashboard, token_task)
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TokenFetched(Ok(token)) => {
                self.token = Some(token);
                self.status = "Ready".to_string();
            }

            Message::TokenFetched(Err(e)) => {
                self.status = format!("Token request failed: {}", e);
            }

            Message::ToggleSearch => {
                self.search_open = !self.search_open;
            }

            Message::SearchTermChanged(term) => {
                self.search_term = term;
            }

            Message::Search => {
                let (Some(config), Some(token)) = (&self.api, &self.token) else {
                    self.status = "Catalog auth is not ready yet".to_string();
                    return Task::none();
                };

                self.status = format!("Searching for \"{}\"...", self.search_term);
                return Task::perform(
                    api::search_games(config.clone(), token.clone(), self.search_term.clone()),
                    Message::SearchResults,
                );
            }

            Message::SearchResults(Ok(options)) => {
                self.status = format!("{} games found", options.len());
                self.search_results = options;
            }

            Message::SearchResults(Err(e)) => {
                self.search_results.clear();
                self.status = format!("Search failed: {}", e);
            }

            Message::ToggleFollow(game) => {
                self.followed.update(move |mut games| {
                    if games.iter().any(|followed| followed.id == game.id) {
                        games.retain(|followed| followed.id != game.id);
                    } else {
                        games.push(game);
                    }
                    games
                });
            }

            Message::FetchStreams => {
                let (Some(config), Some(token)) = (&self.api, &self.token) else {
                    self.status = "Catalog auth is not ready yet".to_string();
                    return Task::none();
                };

                let ids: Vec<u64> = self.followed.get().iter().map(|game| game.id).collect();
                if ids.is_empty() {
                    self.status = "Follow a game first".to_string();
                    return Task::none();
                }

                self.status = "Loading streams...".to_string();
                return Task::perform(
                    api::live_streams(
                        config.clone(),
                        token.clone(),
                        ids,
                        self.blacklisted_tags.get(),
                        self.blacklisted_users.get(),
                    ),
                    Message::StreamsFetched,
                );
            }

            Message::StreamsFetched(Ok(streams)) => {
                self.status = format!("{} live streams", streams.len());
                self.streams = streams;
            }

            Message::StreamsFetched(Err(e)) => {
                self.status = format!("Stream request failed: {}", e);
            }

            Message::ToggleTagBlacklist(tag) => {
                self.blacklisted_tags.update(move |mut tags| {
                    if tags.contains(&tag) {
                        tags.retain(|blocked| blocked != &tag);
                    } else {
                        tags.push(tag);
                    }
                    tags
                });
                self.apply_blacklists();
            }

            Message::ToggleUserBlacklist(user) => {
                self.blacklisted_users.update(move |mut users| {
                    if users.contains(&user) {
                        users.retain(|blocked| blocked != &user);
                    } else {
                        users.push(user);
                    }
                    users
                });
                self.apply_blacklists();
            }

            Message::ExportPrefs => {
                self.status = match self.prefs.export_to_file(EXPORT_FILENAME) {
                    Some(_) => format!("Preferences exported as {}", EXPORT_FILENAME),
                    None => "Export failed".to_string(),
                };
            }

            Message::ImportPathChanged(path) => {
                self.import_path = path;
            }

            Message::ImportPrefs { merge } => match std::fs::read_to_string(self.import_path.trim())
            {
                Ok(document) => {
                    if !self.prefs.import_all(&document, ImportOptions { merge }) {
                        self.status = "Import failed: not a preference document".to_string();
                    }
                }
                Err(e) => {
                    self.status = format!("Cannot read {}: {}", self.import_path, e);
                }
            },

            // The stores already updated themselves through the change bus;
            // these messages exist so the view reflects the new values.
            Message::FollowedSynced(_)
            | Message::BlacklistedTagsSynced(_)
            | Message::BlacklistedUsersSynced(_) => {
                self.status = "Preferences updated".to_string();
            }

            Message::PrefsImported(completed) => {
                self.status = format!("Imported {} preferences", completed.keys);
            }
        }

        Task::none()
    }

    /// Drop already-listed streams that the blacklists now hide
    fn apply_blacklists(&mut self) {
        let tags = self.blacklisted_tags.get();
        let users = self.blacklisted_users.get();
        self.streams.retain(|stream| !api::is_blocked(stream, &tags, &users));
    }

    fn view(&self) -> Element<'_, Message> {
        let actions = row![
            button(if self.search_open {
                "Close search"
            } else {
                "Search games"
            })
            .on_press(Message::ToggleSearch),
            button("Get streams").on_press(Message::FetchStreams),
            button("Export prefs").on_press(Message::ExportPrefs),
        ]
        .spacing(10);

        let mut content = column![
            text("Stream Dashboard").size(32),
            text(format!("Status: {}", self.status)).size(14),
            actions,
        ]
        .spacing(10)
        .padding(20);

        if self.search_open {
            content = content.push(self.search_panel());
        }

        content = content.push(self.followed_panel());
        content = content.push(self.streams_panel());
        content = content.push(self.transfer_panel());

        scrollable(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn search_panel(&self) -> Element<'_, Message> {
        let input = row![
            text_input("Search the catalog", &self.search_term)
                .on_input(Message::SearchTermChanged)
                .on_submit(Message::Search)
                .width(300),
            button("Search").on_press(Message::Search),
        ]
        .spacing(10);

        let followed = self.followed.get();
        let mut results = column![].spacing(5);
        for game in &self.search_results {
            let label = if followed.iter().any(|f| f.id == game.id) {
                format!("* {}", game.label())
            } else {
                game.label()
            };
            results = results.push(button(text(label).size(14)).on_press(Message::ToggleFollow(game.clone())));
        }

        column![text("Search games").size(20), input, results]
            .spacing(10)
            .into()
    }

    fn followed_panel(&self) -> Element<'_, Message> {
        let mut games = column![].spacing(5);
        for game in self.followed.get() {
            let label = text(format!("* {}", game.label())).size(14);
            games = games.push(button(label).on_press(Message::ToggleFollow(game)));
        }

        column![text("Followed games").size(20), games]
            .spacing(10)
            .into()
    }

    fn streams_panel(&self) -> Element<'_, Message> {
        let mut list = column![].spacing(15);
        for stream in &self.streams {
            list = list.push(stream_card(stream));
        }

        column![text("Live streams").size(20), list].spacing(10).into()
    }

    fn transfer_panel(&self) -> Element<'_, Message> {
        let controls = row![
            text_input("Path to an exported preference document", &self.import_path)
                .on_input(Message::ImportPathChanged)
                .width(400),
            button("Import (replace)").on_press(Message::ImportPrefs { merge: false }),
            button("Import (merge)").on_press(Message::ImportPrefs { merge: true }),
        ]
        .spacing(10);

        column![text("Transfer preferences").size(20), controls]
            .spacing(10)
            .into()
    }
}

fn stream_card(stream: &Stream) -> Element<'_, Message> {
    let header = row![
        text(format!("{} ({} viewers)", stream.user_name, stream.viewer_count)).size(16),
        button(text("Hide channel").size(12))
            .on_press(Message::ToggleUserBlacklist(stream.user_name.clone())),
    ]
    .spacing(10);

    let mut tags = row![].spacing(5);
    for tag in &stream.tags {
        tags = tags.push(
            button(text(tag.clone()).size(12)).on_press(Message::ToggleTagBlacklist(tag.clone())),
        );
    }

    column![
        text(stream.title.clone()).size(14),
        header,
        text(format!("{} [{}]", stream.game_name, stream.language)).size(14),
        text(stream.channel_url()).size(12),
        text(stream.thumbnail(320, 180)).size(12),
        tags,
    ]
    .spacing(5)
    .into()
}

fn subscription(dashboard: &Dashboard) -> Subscription<Message> {
    Subscription::batch([
        dashboard.followed.listen().map(Message::FollowedSynced),
        dashboard
            .blacklisted_tags
            .listen()
            .map(Message::BlacklistedTagsSynced),
        dashboard
            .blacklisted_users
            .listen()
            .map(Message::BlacklistedUsersSynced),
        dashboard.prefs.on_import().map(Message::PrefsImported),
    ])
}
