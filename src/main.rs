mod app;
use flashcards_app::*;

use app::MyApp;
use config::AppConfig;
use database::SqliteStore;
use log::{error, info};
use models::Card;
use rand::SeedableRng;
use rand::rngs::StdRng;
use scheduler::SessionScheduler;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env();
    let store = match SqliteStore::open(&config.database_path) {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open database '{}': {}", config.database_path.display(), e);
            std::process::exit(1);
        }
    };

    let sample = vec![
        Card::new("cześć", "hello"),
        Card::new("dziękuję", "thank you"),
        Card::new("proszę", "please"),
    ];
    match store.create_deck_if_empty("Polish Vocabulary", sample) {
        Ok(Some(_)) => info!("Sample data created!"),
        Ok(None) => {}
        Err(e) => error!("Failed to create sample deck: {}", e),
    }

    let deck_set = match store.list_decks() {
        Ok(deck_set) => deck_set,
        Err(e) => {
            error!("Failed to load decks from database: {}", e);
            std::process::exit(1);
        }
    };

    info!("Loaded {} decks from database", deck_set.decks.len());
    for deck in &deck_set.decks {
        info!("  - {} ({} cards)", deck.title, deck.len());
    }

    let rng = match config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let scheduler = SessionScheduler::new(store, rng);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([500.0, 750.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Flashcards",
        options,
        Box::new(|_cc| Ok(Box::new(MyApp::new(deck_set, scheduler, config)))),
    )
}
