use super::print::{
    print_messages, render_articles, render_config, render_home, render_questions,
};
use super::setup::{Cli, Commands, DeleteTarget, FilterArgs, NewPost};
use clap::Parser;
use console::Term;
use devpost::api::DevpostApi;
use devpost::commands::config::ConfigAction;
use devpost::commands::filter::Criteria;
use devpost::commands::form::{Field, ImageAttachment, PostForm};
use devpost::commands::{failure, Action, AlwaysConfirm, CmdResult, Confirm};
use devpost::config::DevpostConfig;
use devpost::error::{DevpostError, Result};
use devpost::gateway::fs::FsGateway;
use devpost::model::{PostType, RecordId};
use directories::ProjectDirs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DATA_ENV: &str = "DEVPOST_DATA";
const LOG_ENV: &str = "DEVPOST_LOG";

struct AppContext {
    api: DevpostApi<FsGateway>,
    config: DevpostConfig,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = match cli.command {
        None | Some(Commands::Home) => {
            print!("{}", render_home());
            return Ok(());
        }
        Some(command) => command,
    };

    let ctx = init_context()?;

    match command {
        Commands::New { post } => handle_new(&ctx, post),
        Commands::Questions {
            filter,
            expand,
            watch,
        } => handle_questions(&ctx, filter, expand, watch),
        Commands::Articles { filter } => handle_articles(&ctx, filter),
        Commands::Delete { target } => match target {
            DeleteTarget::Question { id, yes } => handle_delete(&ctx, PostType::Question, id, yes),
            DeleteTarget::Article { id, yes } => handle_delete(&ctx, PostType::Article, id, yes),
        },
        Commands::Config { key, value } => handle_config(&ctx, key, value),
        Commands::Home => Ok(()),
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "devpost=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_ENV) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("", "", "devpost")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| DevpostError::Config("Could not determine a data directory".to_string()))
}

fn init_context() -> Result<AppContext> {
    let dir = data_dir()?;
    let config = DevpostConfig::load(&dir)?;
    tracing::debug!(data_dir = %dir.display(), "using data directory");

    let gateway = FsGateway::new(dir.clone()).with_base_url(config.base_url.clone());
    Ok(AppContext {
        api: DevpostApi::new(gateway, dir),
        config,
    })
}

/// Prints the messages and ends the process if any of them is an error.
fn finish(result: &CmdResult) -> Result<()> {
    print_messages(&result.messages);
    if result.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

fn handle_new(ctx: &AppContext, post: NewPost) -> Result<()> {
    let mut form = match post {
        NewPost::Question {
            title,
            description,
            tags,
        } => {
            let mut form = PostForm::new(PostType::Question);
            form.set_field(Field::Title, title);
            form.set_field(Field::Description, description);
            form.set_field(Field::Tags, tags);
            form
        }
        NewPost::Article {
            title,
            abstract_text,
            article_text,
            tags,
            image,
        } => {
            let mut form = PostForm::new(PostType::Article);
            form.set_field(Field::Title, title);
            form.set_field(Field::Abstract, abstract_text);
            form.set_field(Field::ArticleText, article_text);
            form.set_field(Field::Tags, tags);
            if let Some(path) = image {
                form.attach_image(read_image(&path)?);
            }
            form
        }
    };

    let result = ctx.api.submit(&mut form);
    if let Some(id) = &result.created {
        println!("{}", id);
    }
    finish(&result)
}

fn read_image(path: &Path) -> Result<ImageAttachment> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(ImageAttachment::new(file_name, bytes))
}

fn criteria(filter: FilterArgs) -> Criteria {
    Criteria {
        title: filter.title.unwrap_or_default(),
        tag: filter.tag.unwrap_or_default(),
        date: filter.date.unwrap_or_default(),
    }
}

fn handle_questions(
    ctx: &AppContext,
    filter: FilterArgs,
    expand: Vec<String>,
    watch: bool,
) -> Result<()> {
    let mut board = match ctx.api.open_questions() {
        Ok(board) => board,
        Err(e) => {
            return finish(
                &CmdResult::default().with_message(failure(Action::Fetch(PostType::Question), &e)),
            )
        }
    };
    for id in &expand {
        board.toggle(&RecordId::new(id.as_str()));
    }
    let criteria = criteria(filter);

    if !watch {
        print!("{}", render_questions(&board.cards(&criteria)));
        board.deactivate();
        return Ok(());
    }

    let term = Term::stdout();
    loop {
        term.clear_screen()?;
        print!("{}", render_questions(&board.cards(&criteria)));
        while !board.wait(Duration::from_secs(1)) {}
    }
}

fn handle_articles(ctx: &AppContext, filter: FilterArgs) -> Result<()> {
    let board = match ctx.api.open_articles() {
        Ok(board) => board,
        Err(e) => {
            return finish(
                &CmdResult::default().with_message(failure(Action::Fetch(PostType::Article), &e)),
            )
        }
    };
    print!("{}", render_articles(&board.cards(&criteria(filter))));
    Ok(())
}

/// Asks on stderr and reads the answer from stdin; anything but y/yes declines.
struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        eprint!("{} [y/N]: ", prompt);
        let _ = io::stderr().flush();
        let mut input = String::new();
        if io::stdin().read_line(&mut input).is_err() {
            return false;
        }
        matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

fn handle_delete(ctx: &AppContext, kind: PostType, id: String, yes: bool) -> Result<()> {
    let mut confirm: Box<dyn Confirm> = if yes || !ctx.config.confirm_deletes {
        Box::new(AlwaysConfirm)
    } else {
        Box::new(PromptConfirm)
    };
    let id = RecordId::new(id);

    let result = match kind {
        PostType::Question => ctx.api.delete_question(&id, confirm.as_mut()),
        PostType::Article => match ctx.api.open_articles() {
            Ok(mut board) => ctx.api.delete_article(&mut board, &id, confirm.as_mut()),
            Err(e) => CmdResult::default().with_message(failure(Action::Delete(kind), &e)),
        },
    };
    finish(&result)
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };

    let result = ctx.api.config(action.clone())?;
    if let (ConfigAction::ShowAll, Some(config)) = (&action, &result.config) {
        print!("{}", render_config(config));
    }
    finish(&result)
}
