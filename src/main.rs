use anyhow::Context;
use catalog_admin::config::ClientConfig;
use catalog_admin::handlers::product_form::{ProductForm, ReferenceField};
use catalog_admin::handlers::products_page::ProductsPage;
use catalog_admin::models::truncate_label;
use catalog_admin::services::attachments::Slot;
use catalog_admin::services::notifier::{Notice, drain};
use catalog_admin::services::preview::LocalFile;
use catalog_admin::{AppState, create_app};
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Option labels and document links are cut to this many characters.
const LABEL_CHARS: usize = 20;

#[derive(Parser, Debug)]
#[command(author, version, about = "Product catalog administration", long_about = None)]
struct Cli {
    /// Operator username (defaults to CATALOG_ADMIN_USERNAME)
    #[arg(short, long)]
    username: Option<String>,

    /// Operator password (defaults to CATALOG_ADMIN_PASSWORD)
    #[arg(short, long)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List products, optionally filtered by a search term
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Print one product as JSON
    Show { id: String },
    /// List categories, types and sizes
    References,
    /// Create a product
    Create(CreateArgs),
    /// Update a product's fields and documents
    Update(UpdateArgs),
    /// Delete a product (asks for --yes)
    Delete {
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct CreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    specify: Option<String>,
    /// Category id
    #[arg(long)]
    category: String,
    /// Type id
    #[arg(long = "type")]
    product_type: Option<String>,
    /// Size id
    #[arg(long)]
    size: Option<String>,
    /// Gallery image, repeatable
    #[arg(long)]
    gallery: Vec<PathBuf>,
    /// Manual PDF
    #[arg(long)]
    manual: Option<PathBuf>,
    /// Project PDF
    #[arg(long)]
    project: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct UpdateArgs {
    id: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    specify: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long = "type")]
    product_type: Option<String>,
    #[arg(long)]
    size: Option<String>,
    #[arg(long)]
    manual: Option<PathBuf>,
    #[arg(long)]
    project: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_admin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env();
    info!(
        "🚀 Catalog admin: API={}, timeout={}s, gallery limit={}",
        config.api_base_url, config.http_timeout_secs, config.gallery_limit
    );

    let username = cli
        .username
        .clone()
        .or_else(|| config.admin_username.clone())
        .unwrap_or_default();
    let password = cli
        .password
        .clone()
        .or_else(|| std::env::var("CATALOG_ADMIN_PASSWORD").ok())
        .unwrap_or_default();

    let mut app = create_app(AppState::from_config(config)?);
    let mut notices = app.subscribe();

    let login = app.login(&username, &password).await;
    print_notices(&mut notices);
    login.context("login failed")?;

    let mut page = app.products_page()?;
    let result = run(&mut page, cli.command).await;
    print_notices(&mut notices);
    result
}

async fn run(page: &mut ProductsPage, command: Command) -> anyhow::Result<()> {
    match command {
        Command::List { search } => {
            page.mount().await?;
            let list = page.list_mut();
            if let Some(search) = search {
                list.set_query(search);
            }
            for product in list.visible() {
                println!(
                    "{:<26} {:<30} {:<16} {:<16} {}",
                    product.id.as_deref().unwrap_or("-"),
                    product.name,
                    product.category_label(),
                    product.type_label(),
                    product.size_label()
                );
            }
        }
        Command::Show { id } => {
            page.open_edit(&id).await?;
            let form = open_form(page)?;
            println!("{}", serde_json::to_string_pretty(form.values())?);
            for preview in form.gallery_previews() {
                println!("gallery: {}", preview.url());
            }
            if let Some(manual) = form.manual_preview() {
                println!("manual: {}", truncate_label(&manual.url(), LABEL_CHARS));
            }
            if let Some(project) = form.project_preview() {
                println!("project: {}", truncate_label(&project.url(), LABEL_CHARS));
            }
        }
        Command::References => {
            page.open_add().await?;
            let form = open_form(page)?;
            for field in [
                ReferenceField::Category,
                ReferenceField::Type,
                ReferenceField::Size,
            ] {
                println!("{}:", field.label());
                for option in form.select_field(field).display_options() {
                    println!(
                        "  {:<26} {}",
                        option.id,
                        truncate_label(&option.label, LABEL_CHARS)
                    );
                }
            }
            page.close_form();
        }
        Command::Create(args) => {
            page.open_add().await?;
            let form = open_form(page)?;
            form.set_name(args.name)?;
            form.set_description(args.description)?;
            form.set_specify(args.specify)?;
            form.select_reference(ReferenceField::Category, &args.category)?;
            if let Some(id) = args.product_type {
                form.select_reference(ReferenceField::Type, &id)?;
            }
            if let Some(id) = args.size {
                form.select_reference(ReferenceField::Size, &id)?;
            }

            let mut images = Vec::with_capacity(args.gallery.len());
            for path in &args.gallery {
                images.push(read_file(path).await?);
            }
            if !images.is_empty() {
                form.add_gallery_images(images)?;
            }
            attach_documents(form, args.manual, args.project).await?;

            page.submit_form().await?;
        }
        Command::Update(args) => {
            page.open_edit(&args.id).await?;
            let form = open_form(page)?;
            if let Some(name) = args.name {
                form.set_name(name)?;
            }
            if let Some(description) = args.description {
                form.set_description(description)?;
            }
            if args.specify.is_some() {
                form.set_specify(args.specify)?;
            }
            let references = [
                (ReferenceField::Category, args.category),
                (ReferenceField::Type, args.product_type),
                (ReferenceField::Size, args.size),
            ];
            for (field, id) in references {
                if let Some(id) = id {
                    form.select_reference(field, &id)?;
                }
            }
            attach_documents(form, args.manual, args.project).await?;

            page.submit_form().await?;
        }
        Command::Delete { id, yes } => {
            let list = page.list_mut();
            list.request_delete(id);
            if yes {
                list.confirm_delete().await?;
            } else {
                list.close_confirm();
                println!("Delete not confirmed; pass --yes to delete.");
            }
        }
    }
    Ok(())
}

fn open_form(page: &mut ProductsPage) -> anyhow::Result<&mut ProductForm> {
    page.form_mut().context("product form is not open")
}

async fn attach_documents(
    form: &mut ProductForm,
    manual: Option<PathBuf>,
    project: Option<PathBuf>,
) -> anyhow::Result<()> {
    if let Some(path) = manual {
        form.select_document(Slot::Manual, read_file(&path).await?)?;
    }
    if let Some(path) = project {
        form.select_document(Slot::Project, read_file(&path).await?)?;
    }
    Ok(())
}

async fn read_file(path: &Path) -> anyhow::Result<LocalFile> {
    LocalFile::from_path(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}

fn print_notices(receiver: &mut broadcast::Receiver<Notice>) {
    for notice in drain(receiver) {
        if notice.is_error() {
            eprintln!("✖ {}", notice.message);
        } else {
            println!("✔ {}", notice.message);
        }
    }
}
