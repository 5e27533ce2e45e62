//! ecopreco CLI - storefront, comparison and admin client
//!
//! Usage:
//!   ecopreco login -u admin -p secret
//!   ecopreco products --keyword soap --min-price 5
//!   ecopreco admin create --name "Bamboo brush" --price 12.90
//!
//! The session (token, username, roles) lives in a sled directory, see
//! `--session-path`; `logout` removes it.

use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;

use ecopreco::catalog::Facet;
use ecopreco::controllers::{
    admin::{self, ProductForm},
    auth::{self, Landing, LoginForm, RegisterForm},
    comparison, prices, reviews, storefront, AppContext, Outcome, StatusMessage,
};
use ecopreco::query::{FilterCriteria, Sort, SortDirection};
use ecopreco::{config, logging, render, Config};

#[derive(Parser)]
#[command(name = "ecopreco")]
#[command(about = "Eco-price catalog client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend base URL; request paths are appended to it
    #[arg(short, long, env = "ECOPRECO_API_URL")]
    url: Option<String>,

    /// Directory holding the persisted session
    #[arg(long, env = "ECOPRECO_SESSION_PATH")]
    session_path: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    Logout,
    Register {
        #[arg(short = 'n', long)]
        full_name: String,
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Request a password reset link
    RecoverPassword {
        #[arg(short, long)]
        email: String,
    },
    /// Show the logged-in user and roles
    Whoami,
    /// Browse the catalog (list, filter or search)
    Products(ListArgs),
    /// Show one product
    Product {
        id: i64,
    },
    /// Distinct categories, brands, stores and eco labels
    Facets,
    /// Compare two products side by side
    Compare {
        first: Option<i64>,
        second: Option<i64>,
    },
    #[command(subcommand)]
    Admin(AdminCommands),
    #[command(subcommand)]
    Reviews(ReviewCommands),
    #[command(subcommand)]
    Prices(PriceCommands),
}

#[derive(Args)]
struct ListArgs {
    #[arg(short, long)]
    keyword: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    brand: Option<String>,
    #[arg(long)]
    store: Option<String>,
    #[arg(long)]
    eco_label: Option<String>,
    #[arg(long)]
    min_price: Option<String>,
    #[arg(long)]
    max_price: Option<String>,
    #[arg(long)]
    min_rating: Option<String>,
    #[arg(long, default_value_t = 0)]
    page: u32,
    /// Defaults to ECOPRECO_PAGE_SIZE
    #[arg(long)]
    size: Option<u32>,
    #[arg(long)]
    sort_by: Option<String>,
    #[arg(long, value_enum, default_value_t = Direction::Asc)]
    sort_dir: Direction,
    /// Skip loading filter options
    #[arg(long)]
    no_facets: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    Asc,
    Desc,
}

#[derive(Args)]
struct ProductArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    brand: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    eco_label: Option<String>,
    #[arg(long)]
    product_url: Option<String>,
    #[arg(long)]
    image_url: Option<String>,
    #[arg(long)]
    store: Option<String>,
    #[arg(long)]
    sustainability_info: Option<String>,
}

impl From<ProductArgs> for ProductForm {
    fn from(a: ProductArgs) -> Self {
        ProductForm {
            name: a.name.unwrap_or_default(),
            description: a.description.unwrap_or_default(),
            price: a.price.unwrap_or_default(),
            brand: a.brand.unwrap_or_default(),
            category: a.category.unwrap_or_default(),
            eco_label: a.eco_label.unwrap_or_default(),
            product_url: a.product_url.unwrap_or_default(),
            image_url: a.image_url.unwrap_or_default(),
            store: a.store.unwrap_or_default(),
            sustainability_info: a.sustainability_info.unwrap_or_default(),
        }
    }
}

#[derive(Subcommand)]
enum AdminCommands {
    List,
    Create(ProductArgs),
    /// Update a product; omitted fields keep their stored value
    Update {
        id: i64,
        #[command(flatten)]
        fields: ProductArgs,
    },
    Delete {
        id: i64,
    },
}

#[derive(Subcommand)]
enum ReviewCommands {
    List {
        product_id: i64,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        size: u32,
    },
    Recent {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        size: u32,
    },
    Add {
        product_id: i64,
        #[arg(short, long)]
        rating: u8,
        #[arg(short, long)]
        comment: Option<String>,
    },
    Delete {
        review_id: i64,
    },
    /// Change rating and comment of your review
    Edit {
        review_id: i64,
        /// Product the review belongs to
        #[arg(long)]
        product_id: i64,
        #[arg(short, long)]
        rating: u8,
        #[arg(short, long)]
        comment: Option<String>,
    },
    /// Reviews by a user, yourself by default
    User {
        username: Option<String>,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        size: u32,
    },
    /// Average rating and review count
    Stats {
        product_id: i64,
    },
    /// How many reviews gave each rating
    Distribution {
        product_id: i64,
    },
}

#[derive(Subcommand)]
enum PriceCommands {
    History {
        product_id: i64,
    },
    Stats {
        product_id: i64,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    config::load_env_file();
    let _log_guard = logging::init();
    let cli = Cli::parse();

    let mut config = Config::load();
    if let Some(url) = cli.url {
        config = config.with_api_url(url);
    }
    if let Some(path) = cli.session_path {
        config = config.with_session_path(path);
    }
    debug!(api_url = %config.api_url, session_path = %config.session_path, "Configured");

    let ctx = AppContext::open(config)?;
    let status = run(&ctx, cli.command).await;

    println!("{status}");
    Ok(if status.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Print the data of an outcome through `show`, return its status.
fn report<T>(outcome: Outcome<T>, show: impl FnOnce(&T) -> String) -> StatusMessage {
    if let Some(data) = &outcome.data {
        let text = show(data);
        if !text.is_empty() {
            println!("{text}");
        }
    }
    outcome.status
}

async fn run(ctx: &AppContext, command: Commands) -> StatusMessage {
    match command {
        Commands::Login { username, password } => {
            let out = auth::login(ctx, &LoginForm { username, password }).await;
            report(out, |landing| match landing {
                Landing::Admin => "Admin commands are available: ecopreco admin --help".to_string(),
                Landing::Storefront => "Browse the catalog: ecopreco products".to_string(),
            })
        }
        Commands::Logout => auth::logout(ctx).status,
        Commands::Register { full_name, username, email, password } => {
            let form = RegisterForm { full_name, username, email, password };
            auth::register(ctx, &form).await.status
        }
        Commands::RecoverPassword { email } => auth::recover_password(ctx, &email).await.status,
        Commands::Whoami => report(auth::whoami(&ctx.session), |s| {
            if s.roles.is_empty() {
                String::new()
            } else {
                format!("Roles: {}", s.roles.join(", "))
            }
        }),
        Commands::Products(args) => {
            let no_facets = args.no_facets;
            let criteria = criteria_from(args, ctx.config.page_size);
            if no_facets {
                let view = storefront::ListingView::new();
                let out = view.refresh(ctx, &criteria).await;
                println!("{}", render::product_list(&view.products()));
                out.status
            } else {
                report(storefront::browse(ctx, &criteria).await, |(page, facets)| {
                    let mut text = render::product_list(&page.content);
                    if let (Some(number), Some(total)) = (page.number, page.total_pages) {
                        text.push_str(&format!("\n\nPage {} of {}", number + 1, total.max(1)));
                    }
                    for (facet, values) in facets {
                        text.push('\n');
                        text.push_str(&render::facet(facet.label(), values));
                    }
                    text
                })
            }
        }
        Commands::Product { id } => report(storefront::product_details(ctx, id).await, render::product_details),
        Commands::Facets => {
            let facets = storefront::load_facets(ctx).await;
            for (facet, values) in &facets {
                println!("{}", render::facet(facet.label(), values));
            }
            StatusMessage::info(format!("{} facets", Facet::ALL.len()))
        }
        Commands::Compare { first, second } => {
            let loaded = comparison::load_index(ctx).await;
            let Some(index) = loaded.data else {
                return loaded.status;
            };
            if first.is_none() || second.is_none() {
                for (id, name) in index.choices() {
                    println!("{id:>6}  {name}");
                }
            }
            report(comparison::compare(&index, first, second), render::comparison)
        }
        Commands::Admin(cmd) => run_admin(ctx, cmd).await,
        Commands::Reviews(cmd) => run_reviews(ctx, cmd).await,
        Commands::Prices(cmd) => match cmd {
            PriceCommands::History { product_id } => {
                report(prices::history(ctx, product_id).await, |h| render::price_history(h))
            }
            PriceCommands::Stats { product_id, from, to } => report(
                prices::statistics(ctx, product_id, from.as_deref(), to.as_deref()).await,
                render::price_statistics,
            ),
        },
    }
}

async fn run_admin(ctx: &AppContext, cmd: AdminCommands) -> StatusMessage {
    match cmd {
        AdminCommands::List => report(admin::list(ctx).await, |p| render::admin_table(p)),
        AdminCommands::Create(fields) => {
            let form = ProductForm::from(fields);
            report(admin::save(ctx, &form, None).await, render::product_details)
        }
        AdminCommands::Update { id, fields } => {
            let changes = ProductForm::from(fields);
            report(admin::patch(ctx, id, &changes).await, render::product_details)
        }
        AdminCommands::Delete { id } => admin::delete(ctx, id).await.status,
    }
}

async fn run_reviews(ctx: &AppContext, cmd: ReviewCommands) -> StatusMessage {
    match cmd {
        ReviewCommands::List { product_id, page, size } => report(
            reviews::for_product(ctx, product_id, page, size).await,
            |p| render::reviews(&p.content),
        ),
        ReviewCommands::Recent { page, size } => {
            report(reviews::recent(ctx, page, size).await, |p| render::reviews(&p.content))
        }
        ReviewCommands::Add { product_id, rating, comment } => report(
            reviews::add(ctx, product_id, rating, comment.as_deref()).await,
            |r| render::reviews(std::slice::from_ref(r)),
        ),
        ReviewCommands::Edit { review_id, product_id, rating, comment } => report(
            reviews::edit(ctx, review_id, product_id, rating, comment.as_deref()).await,
            |r| render::reviews(std::slice::from_ref(r)),
        ),
        ReviewCommands::User { username, page, size } => report(
            reviews::by_user(ctx, username.as_deref(), page, size).await,
            |p| render::reviews(&p.content),
        ),
        ReviewCommands::Delete { review_id } => reviews::delete(ctx, review_id).await.status,
        ReviewCommands::Distribution { product_id } => {
            report(reviews::distribution(ctx, product_id).await, |b| render::rating_distribution(b))
        }
        ReviewCommands::Stats { product_id } => report(reviews::summary(ctx, product_id).await, |s| {
            format!("Average rating: {} ({} reviews)", render::rating(s.average), s.count)
        }),
    }
}

fn criteria_from(args: ListArgs, default_size: u32) -> FilterCriteria {
    FilterCriteria {
        keyword: args.keyword,
        category: args.category,
        brand: args.brand,
        store: args.store,
        eco_label: args.eco_label,
        min_price: args.min_price,
        max_price: args.max_price,
        min_rating: args.min_rating,
        page: args.page,
        page_size: args.size.unwrap_or(default_size),
        sort: args.sort_by.map(|by| Sort {
            by,
            direction: match args.sort_dir {
                Direction::Asc => SortDirection::Asc,
                Direction::Desc => SortDirection::Desc,
            },
        }),
    }
}
