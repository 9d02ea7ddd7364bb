use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use client_core::{
    auth::AuthService,
    config::{load_settings, normalize_base_url, ClientSettings},
    navigation::{HistoryNavigator, Navigator, COMPANIES_PATH, LOGIN_PATH, REGISTER_PATH},
    session::{avatar_initials, Session},
    token::extract_display_name,
    validation::{LoginForm, RegisterForm},
    ApiClient, FilterForm, ListController, ListDependencies, ListSnapshot, SectorDirectory,
    SessionStore, TracingNotifier, User,
};
use shared::domain::{CompanyId, SectorId, SortField};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "review-cli", about = "Browse companies and their reviews")]
struct Cli {
    /// Overrides `api_base_url` from client.toml and the environment.
    #[arg(long, global = true)]
    api_base_url: Option<String>,
    /// Session token from an earlier `login`.
    #[arg(long, global = true, env = "REVIEW_TOKEN")]
    token: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List companies. Flags are applied on top of `--query` in the order
    /// filters, sort, direction, page.
    Companies {
        /// Query string of a listing address, e.g. `page=2&sortBy=Rating`.
        #[arg(long, default_value = "")]
        query: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        sector: Option<i64>,
        #[arg(long)]
        min_rating: Option<f64>,
        #[arg(long, value_enum)]
        sort_by: Option<SortArg>,
        #[arg(long)]
        desc: bool,
        #[arg(long)]
        page: Option<u32>,
    },
    Sectors,
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Register {
        #[arg(long)]
        fullname: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show where opening a company's reviews leads with the current session.
    Reviews {
        #[arg(long)]
        company_id: i64,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SortArg {
    Name,
    Rating,
    ReviewCount,
}

impl From<SortArg> for SortField {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortField::Name,
            SortArg::Rating => SortField::Rating,
            SortArg::ReviewCount => SortField::ReviewCount,
        }
    }
}

struct App {
    api: Arc<ApiClient>,
    session: Arc<SessionStore>,
    history: Arc<HistoryNavigator>,
}

impl App {
    fn new(
        settings: &ClientSettings,
        token: Option<String>,
        start_path: &str,
        query: Option<String>,
    ) -> Result<Self> {
        let session = Arc::new(match token {
            // The address is not part of the token; only the display name is.
            Some(token) => SessionStore::with_session(Session {
                user: User {
                    email: String::new(),
                    name: extract_display_name(&token),
                },
                token,
            }),
            None => SessionStore::new(),
        });
        let history = Arc::new(HistoryNavigator::new(start_path, query));
        let api = ApiClient::with_session(settings, session.clone(), history.clone())
            .context("failed to build HTTP client")?;
        Ok(Self {
            api: Arc::new(api),
            session,
            history,
        })
    }

    fn controller(&self, initial_query: &str) -> ListController {
        ListController::new(
            ListDependencies {
                companies: self.api.clone(),
                sectors: self.api.clone(),
                session: self.session.clone(),
                navigator: self.history.clone(),
                notifier: Arc::new(TracingNotifier),
            },
            initial_query,
        )
    }

    fn auth(&self) -> AuthService {
        AuthService::new(self.api.clone(), self.session.clone(), self.history.clone())
    }

    fn location(&self) -> String {
        self.history
            .current()
            .map(|entry| entry.location())
            .unwrap_or_else(|| self.history.current_path())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(url) = cli.api_base_url {
        settings.api_base_url = normalize_base_url(&url);
    }

    match cli.command {
        Command::Companies {
            query,
            name,
            sector,
            min_rating,
            sort_by,
            desc,
            page,
        } => {
            let query = query.trim_start_matches('?').to_string();
            let app = App::new(&settings, cli.token, COMPANIES_PATH, Some(query.clone()))?;
            let controller = app.controller(&query);
            controller.mount().await;

            if name.is_some() || sector.is_some() || min_rating.is_some() {
                let current = FilterForm::from_params(&controller.snapshot().await.params);
                controller
                    .submit(FilterForm {
                        company_name: name.unwrap_or(current.company_name),
                        sector_id: sector.map(SectorId).or(current.sector_id),
                        min_rating: min_rating.unwrap_or(current.min_rating),
                    })
                    .await;
            }
            if let Some(field) = sort_by {
                controller.apply_sort(field.into()).await;
            }
            if desc && !controller.snapshot().await.params.sort_descending {
                controller.toggle_sort_direction().await;
            }
            if let Some(page) = page {
                controller.go_to_page(page).await;
            }

            let snapshot = controller.snapshot().await;
            let address = app.location();
            info!(
                page = snapshot.pagination.page,
                total_pages = snapshot.pagination.total_pages,
                %address,
                "cli: listing ready"
            );
            print_listing(&snapshot);
            println!("address: {address}");
        }
        Command::Sectors => {
            let app = App::new(&settings, cli.token, COMPANIES_PATH, None)?;
            let sectors = app
                .api
                .fetch_sectors()
                .await
                .inspect_err(|err| warn!("cli: could not load sectors: {err}"))?;
            info!(count = sectors.len(), "cli: sectors loaded");
            for sector in sectors {
                println!("{:>4}  {}", sector.id, sector.name);
            }
        }
        Command::Login { email, password } => {
            let app = App::new(&settings, None, LOGIN_PATH, None)?;
            let user = app
                .auth()
                .login(&LoginForm { email, password })
                .await
                .inspect_err(|err| warn!("cli: login failed: {err}"))?;
            info!(email = %user.email, "cli: signed in");
            println!(
                "signed in as {} [{}]",
                user.name.as_deref().unwrap_or(&user.email),
                avatar_initials(&user)
            );
            if let Some(token) = app.session.token() {
                println!("export REVIEW_TOKEN={token}");
            }
        }
        Command::Register {
            fullname,
            email,
            phone,
            password,
        } => {
            let app = App::new(&settings, None, REGISTER_PATH, None)?;
            app.auth()
                .register(&RegisterForm {
                    fullname,
                    email,
                    phone,
                    password,
                })
                .await
                .inspect_err(|err| warn!("cli: registration failed: {err}"))?;
            println!("registered; continue at {}", app.location());
        }
        Command::Logout => {
            let app = App::new(&settings, cli.token, COMPANIES_PATH, None)?;
            if !app.session.is_authenticated() {
                warn!("cli: logout without a session token");
                println!("not signed in");
                return Ok(());
            }
            app.auth().logout().await;
            println!("signed out");
        }
        Command::Reviews { company_id } => {
            let app = App::new(&settings, cli.token, COMPANIES_PATH, None)?;
            let route = app.controller("").view_reviews(CompanyId(company_id));
            info!(company_id, ?route, "cli: reviews route resolved");
            println!("{route:?} -> {}", app.location());
        }
    }

    Ok(())
}

fn print_listing(snapshot: &ListSnapshot) {
    match &snapshot.results {
        Some(results) if results.items.is_empty() => println!("no companies match"),
        Some(results) => {
            for company in &results.items {
                println!(
                    "{:>4}  {:<28} {:<14} {:<16} {:.1} ({} reviews)",
                    company.id,
                    company.name,
                    company.city,
                    company.sector_name,
                    company.average_rating,
                    company.review_count
                );
            }
        }
        None => println!("listing unavailable"),
    }
    let pagination = snapshot.pagination;
    println!(
        "page {} of {}{}{}",
        pagination.page,
        pagination.total_pages,
        if pagination.has_previous { "  [prev]" } else { "" },
        if pagination.has_next { "  [next]" } else { "" },
    );
}
