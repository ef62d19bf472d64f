//! Main application UI and state management.
//! Handles deck management, import/export and the study screen driven by the scheduler.

use flashcards_app::config::AppConfig;
use flashcards_app::database::SqliteStore;
use flashcards_app::export::json::{
    backup_deck, export_all_to_dir, export_json_to_path, import_json, parse_generated_cards,
};
use flashcards_app::models::{Deck, DeckSet};
use flashcards_app::scheduler::{GradeOutcome, SessionScheduler, StudyError};
use eframe::egui;
use log::{error, warn};
use rand::rngs::StdRng;
use uuid::Uuid;

/// Application screen states
#[derive(Default)]
enum AppScreen {
    #[default]
    Main,
    Study,
}

/// Main application state
pub struct MyApp {
    show_confirmation_dialog: bool,
    allowed_to_close: bool,
    all_decks: DeckSet,
    selected_deck: Option<Uuid>,
    current_question: String,
    current_answer: String,
    new_deck_title: String,
    generated_reply: String,
    config: AppConfig,
    scheduler: SessionScheduler<SqliteStore, StdRng>,

    current_screen: AppScreen,
    show_answer: bool,
    study_deck_title: String,
    study_warning: Option<String>,

    show_export_dialog: bool,
    show_result_dialog: bool,
    result_message: String,
}

impl eframe::App for MyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        match self.current_screen {
            AppScreen::Main => self.render_main_screen(ctx),
            AppScreen::Study => self.render_study_screen(ctx),
        }

        // Handle window close requests with confirmation dialog
        if ctx.input(|i| i.viewport().close_requested()) && !self.allowed_to_close {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.show_confirmation_dialog = true;
        }

        if self.show_confirmation_dialog {
            egui::Window::new("Do you want to quit?")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("No").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = false;
                        }

                        if ui.button("Yes").clicked() {
                            self.show_confirmation_dialog = false;
                            self.allowed_to_close = true;
                            ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                });
        }

        if self.show_export_dialog {
            let mut export_deck: Option<Uuid> = None;
            let mut should_cancel = false;

            egui::Window::new("Export Deck")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label("Select a deck to export:");
                    ui.separator();

                    for deck in &self.all_decks.decks {
                        if ui
                            .button(format!("{} ({} cards)", deck.title, deck.len()))
                            .clicked()
                        {
                            export_deck = Some(deck.id);
                        }
                    }

                    ui.separator();

                    if ui.button("Cancel").clicked() {
                        should_cancel = true;
                    }
                });

            if let Some(id) = export_deck {
                self.handle_export(id);
            }
            if should_cancel {
                self.show_export_dialog = false;
            }
        }

        if self.show_result_dialog {
            egui::Window::new("Result")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&self.result_message);
                    ui.add_space(10.0);
                    if ui.button("OK").clicked() {
                        self.show_result_dialog = false;
                    }
                });
        }
    }
}

impl MyApp {
    /// Creates a new application instance with decks loaded from the store
    pub fn new(deckset: DeckSet, scheduler: SessionScheduler<SqliteStore, StdRng>, config: AppConfig) -> Self {
        let selected_deck = deckset.decks.first().map(|d| d.id);
        Self {
            show_confirmation_dialog: false,
            allowed_to_close: false,
            all_decks: deckset,
            selected_deck,
            current_question: String::new(),
            current_answer: String::new(),
            new_deck_title: String::new(),
            generated_reply: String::new(),
            config,
            scheduler,
            current_screen: AppScreen::Main,
            show_answer: false,
            study_deck_title: String::new(),
            study_warning: None,
            show_export_dialog: false,
            show_result_dialog: false,
            result_message: String::new(),
        }
    }

    fn show_result(&mut self, message: String) {
        self.result_message = message;
        self.show_result_dialog = true;
    }

    fn reload_decks(&mut self) {
        match self.scheduler.store().list_decks() {
            Ok(decks) => self.all_decks = decks,
            Err(e) => error!("Failed to reload decks: {}", e),
        }
    }

    /// Keeps a JSON copy of the deck next to the database
    fn backup(&self, id: Uuid) {
        if let Some(deck) = self.all_decks.find(id) {
            if let Err(e) = backup_deck(deck, &self.config.backup_dir) {
                warn!("Backup of deck '{}' failed: {}", deck.title, e);
            }
        }
    }

    /// Renders the main screen with deck management interface
    fn render_main_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            // Import/Export buttons
            ui.horizontal(|ui| {
                if ui.button("Export Deck").clicked() {
                    self.show_export_dialog = true;
                }
                if ui.button("Export All").clicked() {
                    self.handle_export_all();
                }
                if ui.button("Import Decks").clicked() {
                    self.handle_import();
                }
            });

            ui.separator();

            // Deck creation section
            ui.heading("Create New Deck");
            ui.horizontal(|ui| {
                ui.label("Deck title:");
                ui.text_edit_singleline(&mut self.new_deck_title);
            });
            ui.label("Generated cards (JSON array, optional):");
            ui.add(
                egui::TextEdit::multiline(&mut self.generated_reply)
                    .desired_rows(3)
                    .desired_width(f32::INFINITY),
            );
            if ui.button("Create Deck").clicked() && !self.new_deck_title.trim().is_empty() {
                self.handle_create_deck();
            }

            ui.separator();

            ui.heading(format!("Decks ({})", self.all_decks.decks.len()));

            // We store actions to execute after UI rendering to avoid borrowing conflicts
            let mut action_select: Option<Uuid> = None;
            let mut action_study: Option<Uuid> = None;
            let mut action_delete: Option<Uuid> = None;

            egui::ScrollArea::vertical()
                .id_source("decks_list")
                .max_height(150.0)
                .show(ui, |ui| {
                    for (i, deck) in self.all_decks.decks.iter().enumerate() {
                        let is_selected = self.selected_deck == Some(deck.id);

                        ui.horizontal(|ui| {
                            if ui
                                .selectable_label(
                                    is_selected,
                                    format!("{}. {} ({} cards)", i + 1, deck.title, deck.len()),
                                )
                                .clicked()
                            {
                                action_select = Some(deck.id);
                            }

                            if ui.button("Study").clicked() {
                                action_study = Some(deck.id);
                            }
                            if ui.button("Delete").clicked() {
                                action_delete = Some(deck.id);
                            }
                        });
                    }
                });

            // Execute deferred actions
            if let Some(id) = action_select {
                self.selected_deck = Some(id);
            }
            if let Some(id) = action_study {
                self.start_study_session(id);
            }
            if let Some(id) = action_delete {
                self.handle_delete(id);
            }

            ui.separator();

            // Card management for selected deck
            let Some(deck) = self.selected_deck.and_then(|id| self.all_decks.find(id)).cloned() else {
                ui.label("Select a deck to add cards");
                return;
            };

            ui.heading(format!("Selected Deck: {}", deck.title));

            ui.horizontal(|ui| {
                ui.label("Question:");
                ui.text_edit_singleline(&mut self.current_question);
            });

            ui.horizontal(|ui| {
                ui.label("Answer:");
                ui.text_edit_singleline(&mut self.current_answer);
            });
            if ui.button("Add Card").clicked()
                && !self.current_question.is_empty()
                && !self.current_answer.is_empty()
            {
                self.handle_add_card(deck.id);
            }

            ui.separator();

            ui.heading(format!("Cards ({})", deck.len()));

            egui::ScrollArea::vertical()
                .id_source("cards_list")
                .max_height(200.0)
                .show(ui, |ui| {
                    for (i, card) in deck.cards.iter().enumerate() {
                        ui.group(|ui| {
                            ui.label(format!("{}. Question: {}", i + 1, card.question));
                            ui.label(format!("   Answer: {}", card.answer));
                            ui.label(format!(
                                "   Correct: {} / {}",
                                card.correct_attempts, card.attempts
                            ));
                        });
                    }
                });
        });
    }

    /// Renders the study screen with the card at the front of the session
    fn render_study_screen(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(format!("Studying: {}", self.study_deck_title));

            if let Some(progress) = self.scheduler.progress() {
                ui.label(progress.message());
            }
            if let Some(warning) = &self.study_warning {
                ui.colored_label(egui::Color32::YELLOW, warning);
            }

            ui.add_space(20.0);

            // Store actions to execute after UI rendering
            let mut action_grade: Option<bool> = None;
            let mut action_back = false;

            match self.scheduler.current_card() {
                Some(card) => {
                    let question = card.question.clone();
                    let answer = card.answer.clone();

                    ui.group(|ui| {
                        ui.set_min_height(200.0);
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);

                            ui.heading("Question:");
                            ui.label(&question);

                            ui.add_space(20.0);

                            if self.show_answer {
                                ui.heading("Answer:");
                                ui.label(&answer);
                            } else {
                                ui.label("(Click 'Show Answer' to reveal)");
                            }

                            ui.add_space(20.0);
                        });
                    });

                    ui.add_space(20.0);

                    if !self.show_answer {
                        if ui.button("Show Answer").clicked() {
                            self.show_answer = true;
                        }
                    } else {
                        ui.label("Did you know it?");
                        ui.horizontal(|ui| {
                            if ui.button("Incorrect").clicked() {
                                action_grade = Some(false);
                            }
                            if ui.button("Correct").clicked() {
                                action_grade = Some(true);
                            }
                        });
                    }
                }
                None => {
                    ui.heading("Session finished!");
                    ui.label("Every card in this deck has been retired.");
                }
            }

            ui.add_space(20.0);

            if ui.button("Back to Main Screen").clicked() {
                action_back = true;
            }

            // Execute deferred actions
            if let Some(is_correct) = action_grade {
                self.handle_grade(is_correct);
            }
            if action_back {
                self.current_screen = AppScreen::Main;
                self.reload_decks();
            }
        });
    }

    fn start_study_session(&mut self, id: Uuid) {
        let title = self
            .all_decks
            .find(id)
            .map(|d| d.title.clone())
            .unwrap_or_default();

        match self.scheduler.start_by_id(id) {
            Ok(_) => {
                self.study_deck_title = title;
                self.show_answer = false;
                self.study_warning = None;
                self.current_screen = AppScreen::Study;
            }
            Err(StudyError::EmptyDeck(_)) => {
                self.show_result(format!("Deck '{}' has no cards yet.", title));
            }
            Err(e) => {
                error!("Could not start study session: {}", e);
                self.show_result(format!("Could not load the deck: {}", e));
            }
        }
    }

    fn handle_grade(&mut self, is_correct: bool) {
        self.show_answer = false;
        match self.scheduler.grade(is_correct) {
            Ok(GradeOutcome::Finished) => {
                self.study_warning = None;
                self.reload_decks();
                self.current_screen = AppScreen::Main;
                self.show_result(format!("Study session for '{}' finished!", self.study_deck_title));
            }
            Ok(_) => self.study_warning = None,
            Err(e) => {
                // The session itself has advanced; only the saved statistics are behind.
                if self.scheduler.is_active() {
                    self.study_warning = Some(format!("{}", e));
                } else {
                    self.study_warning = None;
                    self.reload_decks();
                    self.current_screen = AppScreen::Main;
                    self.show_result(format!(
                        "Study session for '{}' finished, but the last result was not saved: {}",
                        self.study_deck_title, e
                    ));
                }
            }
        }
    }

    fn handle_create_deck(&mut self) {
        let cards = if self.generated_reply.trim().is_empty() {
            Vec::new()
        } else {
            match parse_generated_cards(&self.generated_reply) {
                Ok(cards) => cards,
                Err(e) => {
                    self.show_result(format!("Could not read the generated cards: {}", e));
                    return;
                }
            }
        };

        let title = self.all_decks.unique_title(&self.new_deck_title);
        match self.scheduler.store().create_deck(&title, cards) {
            Ok(deck) => {
                let id = deck.id;
                self.all_decks.upsert(deck);
                self.selected_deck = Some(id);
                self.backup(id);
                self.new_deck_title.clear();
                self.generated_reply.clear();
            }
            Err(e) => self.show_result(format!("Failed to create deck: {}", e)),
        }
    }

    fn handle_add_card(&mut self, deck_id: Uuid) {
        let added = self
            .scheduler
            .store()
            .add_card(deck_id, &self.current_question, &self.current_answer)
            .and_then(|_| self.scheduler.store().get_deck(deck_id));

        match added {
            Ok(Some(deck)) => {
                self.all_decks.upsert(deck);
                self.backup(deck_id);
                self.current_question.clear();
                self.current_answer.clear();
            }
            Ok(None) => self.show_result("The deck no longer exists.".to_string()),
            Err(e) => self.show_result(format!("Failed to add card: {}", e)),
        }
    }

    fn handle_delete(&mut self, id: Uuid) {
        match self.scheduler.store().delete_deck(id) {
            Ok(()) => {
                self.all_decks.remove(id);
                if self.selected_deck == Some(id) {
                    self.selected_deck = self.all_decks.decks.first().map(|d| d.id);
                }
            }
            Err(e) => self.show_result(format!("Failed to delete deck: {}", e)),
        }
    }

    /// Handles deck export to JSON file
    fn handle_export(&mut self, id: Uuid) {
        self.show_export_dialog = false;
        let Some(deck) = self.all_decks.find(id).cloned() else {
            return;
        };

        // Open file save dialog
        if let Some(path) = rfd::FileDialog::new()
            .set_file_name(format!("{}.json", deck.title))
            .add_filter("JSON files", &["json"])
            .save_file()
        {
            let message = match export_json_to_path(&deck, &path) {
                Ok(()) => format!("Deck '{}' exported successfully!", deck.title),
                Err(e) => format!("Export failed: {}", e),
            };
            self.show_result(message);
        }
    }

    fn handle_export_all(&mut self) {
        let message = match export_all_to_dir(&self.all_decks.decks, &self.config.backup_dir) {
            Ok(path) => format!("All decks exported to {}", path.display()),
            Err(e) => format!("Export failed: {}", e),
        };
        self.show_result(message);
    }

    /// Handles deck import from JSON file
    fn handle_import(&mut self) {
        // Open file selection dialog
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON files", &["json"])
            .pick_file()
        else {
            return;
        };

        let decks: Vec<Deck> = match import_json(&path) {
            Ok(decks) => decks,
            Err(e) => {
                self.show_result(format!(
                    "Import failed: {}\n\nExpected a deck or an array of decks:\n{{\n  \"title\": \"Deck Title\",\n  \"cards\": [...]\n}}",
                    e
                ));
                return;
            }
        };

        let count = decks.len();
        for deck in decks {
            if let Err(e) = self.scheduler.store().save_deck(&deck) {
                self.show_result(format!("Failed to import deck '{}': {}", deck.title, e));
                return;
            }
            let id = deck.id;
            self.all_decks.upsert(deck);
            self.backup(id);
        }

        self.show_result(format!("Imported {} decks successfully!", count));
    }
}
