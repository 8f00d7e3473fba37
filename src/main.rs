use std::env;
use std::sync::Arc;

use dotenvy::dotenv;
use tpka_admin::domain::operator::Operator;
use tpka_admin::domain::participant::Participant;
use tpka_admin::domain::partner::Partner;
use tpka_admin::domain::question_package::QuestionPackage;
use tpka_admin::domain::resource::ListResource;
use tpka_admin::domain::schedule::Schedule;
use tpka_admin::models::config::ClientConfig;
use tpka_admin::pagination::PageWindow;
use tpka_admin::repository::{HttpRepository, ResourceReader};
use tpka_admin::{ListSettings, ListStatus, ListViewModel, QueryCache};

const USAGE: &str = "usage: tpka-admin <operators|participants|partners|question-packages|schedules> [search] [page]";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let mut args = env::args().skip(1);
    let Some(resource) = args.next() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    let search = args.next().filter(|text| !text.trim().is_empty());
    let page = match args.next().map(|page| page.parse::<usize>()) {
        None => 1,
        Some(Ok(page)) => page,
        Some(Err(err)) => {
            log::error!("Invalid page number: {err}");
            std::process::exit(2);
        }
    };

    let config = match ClientConfig::load() {
        Ok(config) => config,
        Err(err) => {
            log::error!("Error loading settings: {err}");
            std::process::exit(1);
        }
    };

    let reader: Arc<dyn ResourceReader> = match HttpRepository::new(&config) {
        Ok(repo) => Arc::new(repo),
        Err(err) => {
            log::error!("Failed to build API client: {err}");
            std::process::exit(1);
        }
    };

    let request = ListRequest {
        reader,
        cache: QueryCache::with_gc_time(config.gc_time()),
        settings: config.list_settings(),
        search,
        page,
    };

    let ok = match resource.as_str() {
        "operators" => {
            request
                .show::<Operator>(|o| format!("{}\t{}\t{}", o.id, o.name, o.email))
                .await
        }
        "participants" => {
            request
                .show::<Participant>(|p| {
                    let registered = if p.is_registered() { "registered" } else { "pending" };
                    format!("{}\t{}\t{}\t{registered}", p.id, p.name, p.email)
                })
                .await
        }
        "partners" => {
            request
                .show::<Partner>(|p| format!("{}\t{}\tactive={}", p.id, p.name, p.is_active))
                .await
        }
        "question-packages" => {
            request
                .show::<QuestionPackage>(|p| {
                    format!("{}\t{}\tactive={}", p.id, p.name, p.is_active)
                })
                .await
        }
        "schedules" => {
            request
                .show::<Schedule>(|s| {
                    format!(
                        "{}\t{} {}\tcapacity={}\t{}",
                        s.id,
                        s.date,
                        s.start_time.format("%H:%M"),
                        s.capacity,
                        s.status
                    )
                })
                .await
        }
        other => {
            log::error!("Unknown resource `{other}`");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    if !ok {
        std::process::exit(1);
    }
}

struct ListRequest {
    reader: Arc<dyn ResourceReader>,
    cache: QueryCache,
    settings: ListSettings,
    search: Option<String>,
    page: usize,
}

impl ListRequest {
    /// Loads one page of `T` and prints its rows and page links.
    async fn show<T: ListResource>(self, describe: fn(&T) -> String) -> bool {
        let mut view = ListViewModel::<T>::new(self.reader, self.cache, &self.settings);

        if let Some(search) = self.search {
            let mut settled = view.subscribe_search();
            view.set_free_text(search);
            if settled.changed().await.is_err() {
                log::error!("Search input closed before settling");
                return false;
            }
        }
        view.set_page(self.page);

        let snapshot = view.refresh().await;
        if snapshot.status == ListStatus::Error {
            log::error!(
                "Failed to load {}: {}",
                T::RESOURCE.name,
                snapshot.error.unwrap_or_default()
            );
            return false;
        }

        for row in snapshot.rows() {
            println!("{}", describe(row));
        }
        if let Some(page) = &snapshot.data {
            println!(
                "{} of {} ({})",
                page.current_page,
                page.last_page,
                render_window(&page.nav().window(), page.current_page)
            );
        }

        view.dispose();
        true
    }
}

fn render_window(window: &PageWindow, current: usize) -> String {
    window
        .iter()
        .map(|page| match page {
            Some(page) if *page == current => format!("[{page}]"),
            Some(page) => page.to_string(),
            None => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
