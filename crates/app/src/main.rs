//! `blogdesk` — command-line front end for the blog backend.
//!
//! # Environment Variables
//!
//! - `BLOGDESK_API_URL`: backend base URL (default `http://localhost:8080`)
//! - `BLOGDESK_SESSION_DIR`: where the session is kept
//! - `RUST_LOG`: log filter (default `info`); logs go to stderr

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use blogdesk_app::{AppConfig, AppContext, BlogPostForm, LoginForm, Navigation, UserForm};
use blogdesk_auth::{Authority, FileStore, GuardDecision, Requirement, explain};
use blogdesk_client::{ApiClient, BlogPostQuery, SortField, SortOrder};
use blogdesk_core::{BlogPostId, RoleId, UserId};
use blogdesk_observability::LogFormat;

/// Blog client with local permission checks
#[derive(Parser, Debug)]
#[command(name = "blogdesk")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Backend base URL (also: BLOGDESK_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Session directory (also: BLOGDESK_SESSION_DIR)
    #[arg(long, global = true)]
    session_dir: Option<PathBuf>,

    /// Log output on stderr: json or compact
    #[arg(long, global = true, default_value = "json")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user and their authorities
    Whoami,
    /// Check authorities against the stored session
    Can {
        #[arg(required = true)]
        authorities: Vec<Authority>,
        /// Succeed when any one is held instead of all
        #[arg(long)]
        any: bool,
    },
    /// Resolve a path against the route table
    Route { path: String },
    /// Blog posts
    #[command(subcommand)]
    Posts(PostsCommand),
    /// User administration
    #[command(subcommand)]
    Users(UsersCommand),
    /// List roles (admin mode only)
    Roles,
}

#[derive(Subcommand, Debug)]
enum PostsCommand {
    List {
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long, default_value = "date")]
        sort_by: SortField,
        #[arg(long, default_value = "desc")]
        order: SortOrder,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        author: Option<UserId>,
    },
    Show { id: BlogPostId },
    Create(PostFields),
    Edit {
        id: BlogPostId,
        #[command(flatten)]
        fields: PostEdits,
    },
    Delete { id: BlogPostId },
}

#[derive(Args, Debug)]
struct PostFields {
    #[arg(long)]
    title: String,
    #[arg(long)]
    text: String,
    #[arg(long)]
    category: String,
}

#[derive(Args, Debug)]
struct PostEdits {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    text: Option<String>,
    #[arg(long)]
    category: Option<String>,
}

#[derive(Subcommand, Debug)]
enum UsersCommand {
    List,
    Show { id: UserId },
    Create {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        role: Option<RoleId>,
    },
    Edit {
        id: UserId,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<RoleId>,
    },
    Delete { id: UserId },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    blogdesk_observability::init(cli.log_format);

    let mut config = AppConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config = config.with_api_url(url)?;
    }
    if let Some(dir) = cli.session_dir {
        config = config.with_session_dir(dir);
    }

    let store = FileStore::open(&config.session_dir)
        .with_context(|| format!("failed to open session directory {:?}", config.session_dir))?;
    let mut ctx = AppContext::new(ApiClient::new(&config.api_url), store);
    tracing::debug!(api_url = %config.api_url, "starting");

    match cli.command {
        Command::Login { email, password } => match ctx.login(LoginForm::new(email, password)).await {
            Ok(principal) => println!("signed in as {}", principal.display_name()),
            Err(err) => {
                eprintln!("{}", err.login_message());
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Logout => {
            ctx.logout()?;
            println!("signed out");
        }
        Command::Whoami => match ctx.principal() {
            Some(principal) => {
                let authorities = ctx.gate().permissions().sorted();
                let unrecognized = authorities.iter().filter(|a| !a.is_known()).cloned().collect();
                print_json(&Whoami {
                    name: principal.display_name(),
                    authorities,
                    unrecognized,
                    principal,
                })?
            }
            None => {
                println!("not signed in");
                return Ok(ExitCode::FAILURE);
            }
        },
        Command::Can { authorities, any } => {
            let requirement = if any {
                Requirement::any(authorities)
            } else {
                Requirement::all(authorities)
            };
            let explanation = explain(ctx.gate(), &requirement);
            println!("{}", explanation.reason);
            if explanation.decision != GuardDecision::Render {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Route { path } => {
            let navigation = ctx.navigate(&path);
            match navigation {
                Navigation::Render(route) => println!("render {route}"),
                Navigation::Redirect { from, to } => println!("{from} -> {to}"),
            }
            if matches!(navigation, Navigation::Redirect { .. }) {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Posts(command) => posts(&ctx, command).await?,
        Command::Users(command) => users(&ctx, command).await?,
        Command::Roles => print_json(&ctx.list_roles().await?)?,
    }

    Ok(ExitCode::SUCCESS)
}

#[derive(Serialize)]
struct Whoami {
    name: String,
    authorities: Vec<Authority>,
    /// Granted names this client has no meaning for.
    unrecognized: Vec<Authority>,
    principal: blogdesk_auth::Principal,
}

async fn posts(ctx: &AppContext<FileStore>, command: PostsCommand) -> Result<()> {
    match command {
        PostsCommand::List {
            page,
            sort_by,
            order,
            category,
            author,
        } => {
            let mut query = BlogPostQuery::default().page(page).sort(sort_by, order);
            if let Some(category) = category {
                query = query.category(category);
            }
            if let Some(author) = author {
                query = query.author(author);
            }
            let page = ctx.list_posts(&query).await?;
            for post in &page.content {
                let id = post.id.map(|id| id.to_string()).unwrap_or_default();
                println!("{id}  [{}] {}", post.category, post.title);
            }
            println!("{}", page_label(&page));
        }
        PostsCommand::Show { id } => {
            let post = ctx.get_post(id).await?;
            print_json(&PostView {
                actions: ctx.post_actions(&post),
                post,
            })?;
        }
        PostsCommand::Create(fields) => {
            let post = ctx
                .create_post(BlogPostForm::new(fields.title, fields.text, fields.category))
                .await?;
            print_json(&post)?;
        }
        PostsCommand::Edit { id, fields } => {
            let post = ctx.get_post(id).await?;
            let mut form = BlogPostForm::from_post(&post);
            if let Some(title) = fields.title {
                form.title = title;
            }
            if let Some(text) = fields.text {
                form.text = text;
            }
            if let Some(category) = fields.category {
                form.category = category;
            }
            print_json(&ctx.edit_post(&post, form).await?)?;
        }
        PostsCommand::Delete { id } => {
            ctx.delete_post(id).await?;
            println!("deleted {id}");
        }
    }
    Ok(())
}

/// One-based page footer; tolerates any numbers the backend sends.
fn page_label(page: &blogdesk_client::BlogPostPage) -> String {
    format!(
        "page {} of {} ({} posts)",
        page.current_page.saturating_add(1),
        page.total_pages.max(1),
        page.total_elements
    )
}

#[derive(Serialize)]
struct PostView {
    post: blogdesk_client::BlogPost,
    actions: blogdesk_app::PostActions,
}

async fn users(ctx: &AppContext<FileStore>, command: UsersCommand) -> Result<()> {
    match command {
        UsersCommand::List => {
            for user in ctx.list_users().await? {
                let id = user.id.map(|id| id.to_string()).unwrap_or_default();
                println!("{id}  {} <{}>", user.display_name(), user.email);
            }
        }
        UsersCommand::Show { id } => print_json(&ctx.get_user(id).await?)?,
        UsersCommand::Create {
            first_name,
            last_name,
            email,
            password,
            role,
        } => {
            let form = UserForm {
                first_name,
                last_name,
                email,
                password: Some(password),
                selected_role_id: role,
                ..UserForm::for_create()
            };
            print_json(&ctx.create_user(form).await?)?;
        }
        UsersCommand::Edit {
            id,
            first_name,
            last_name,
            email,
            role,
        } => {
            let mut form = UserForm::from_user(&ctx.get_user(id).await?);
            if let Some(first_name) = first_name {
                form.first_name = first_name;
            }
            if let Some(last_name) = last_name {
                form.last_name = last_name;
            }
            if let Some(email) = email {
                form.email = email;
            }
            if role.is_some() {
                form.selected_role_id = role;
            }
            print_json(&ctx.update_user(form).await?)?;
        }
        UsersCommand::Delete { id } => {
            ctx.delete_user(id).await?;
            println!("deleted {id}");
        }
    }
    Ok(())
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogdesk_client::BlogPostPage;

    fn page(current_page: u32, total_pages: u32) -> BlogPostPage {
        BlogPostPage {
            content: Vec::new(),
            total_pages,
            total_elements: 0,
            current_page,
            page_size: blogdesk_client::PAGE_SIZE,
            first: true,
            last: true,
        }
    }

    #[test]
    fn page_label_is_one_based() {
        assert_eq!(page_label(&page(0, 0)), "page 1 of 1 (0 posts)");
        assert_eq!(page_label(&page(2, 4)), "page 3 of 4 (0 posts)");
    }

    #[test]
    fn page_label_survives_max_page() {
        assert_eq!(page_label(&page(u32::MAX, 1)), format!("page {} of 1 (0 posts)", u32::MAX));
    }

    #[test]
    fn log_format_flag_parses() {
        let cli = Cli::try_parse_from(["blogdesk", "--log-format", "compact", "whoami"]).unwrap();
        assert_eq!(cli.log_format, LogFormat::Compact);
        assert!(Cli::try_parse_from(["blogdesk", "--log-format", "xml", "whoami"]).is_err());
    }
}
