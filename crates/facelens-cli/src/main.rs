use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use facelens_client::{
    submit_groups, ApiClient, Config, DetectionHistory, LoadEvent, PageSource, PagedLoader,
    PersonSearch, Reply,
};
use facelens_core::format::{normalize_search_name, parse_day, DateRange};
use facelens_core::types::PersonUpdate;
use facelens_core::{group_uploads, BoundingBox, ImageGeometry, Overlay, SelectionSync};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod images;
mod render;

#[derive(Parser)]
#[command(
    name = "facelens",
    about = "Face recognition client: detect, search, history and personnel records"
)]
struct Cli {
    /// Recognition API base URL (overrides config file and FACELENS_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect and identify faces in a photo
    Detect {
        image: PathBuf,
        /// Toggle the candidate group of face N (1-based); repeatable
        #[arg(short, long)]
        expand: Vec<usize>,
        /// Height the photo is displayed at, for overlay coordinates
        #[arg(long)]
        display_height: Option<f32>,
    },
    /// Show a stored detection by ID
    Detection {
        id: String,
        /// Toggle the candidate group of face N (1-based); repeatable
        #[arg(short, long)]
        expand: Vec<usize>,
    },
    /// Search personnel records by name
    Search {
        name: String,
        /// Load every page instead of prompting for more
        #[arg(long)]
        all: bool,
    },
    /// Browse detection history
    History {
        /// First day, YYYYMMDD
        #[arg(long)]
        from: Option<String>,
        /// Last day, YYYYMMDD (defaults to --from)
        #[arg(long)]
        to: Option<String>,
        /// Load every page instead of prompting for more
        #[arg(long)]
        all: bool,
    },
    /// View or edit a personnel record
    Person {
        #[command(subcommand)]
        action: PersonAction,
    },
    /// Upload reference photos named after the person they show
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Subcommand)]
enum PersonAction {
    /// Show a record
    Show { name: String },
    /// Rename a record
    Rename { name: String, new_name: String },
    /// Append photos to a record
    AddImages {
        name: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Remove the Nth photo (1-based) from a record
    RemoveImage { name: String, index: usize },
    /// Delete a record
    Delete {
        name: String,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load().context("loading configuration")?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }

    if let Commands::Config = cli.command {
        if let Some(path) = facelens_client::config::config_path() {
            println!("# config file: {}", path.display());
        }
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let client = ApiClient::new(&config)?;
    tracing::debug!(api = client.base_url(), "client ready");

    match cli.command {
        Commands::Detect {
            image,
            expand,
            display_height,
        } => {
            let image_data = images::read_base64(&image)?;
            let report = client
                .submit_detection(image_data, config.top_n)
                .await?
                .into_result()
                .context("detection request rejected")?;
            let rendered = display_height.unwrap_or(config.display_height);
            let natural = images::natural_height_of_file(&image);
            show_faces(report.bboxes, rendered, natural, &expand)?;
        }
        Commands::Detection { id, expand } => {
            let detection = match client.get_detection(&id).await? {
                Reply::Data(Some(d)) => d,
                Reply::Data(None) => bail!("detection {id} not found"),
                Reply::Status(code) => bail!("detection {id}: server returned {code}"),
            };
            let offset = config.timezone_offset_hours;
            println!("{}", render::detection_line(0, &detection, offset));
            let natural = images::natural_height_of_base64(&detection.image_data);
            show_faces(detection.bboxes, config.display_height, natural, &expand)?;
        }
        Commands::Search { name, all } => {
            let source = PersonSearch::new(client, normalize_search_name(&name));
            let loader = PagedLoader::new(source, config.page_size);
            browse(&loader, all, render::person_line).await?;
        }
        Commands::History { from, to, all } => {
            let range = date_range(from.as_deref(), to.as_deref())?;
            let offset = config.timezone_offset_hours;
            let source = DetectionHistory::new(client, range);
            let loader = PagedLoader::new(source, config.page_size);
            browse(&loader, all, |idx, d| render::detection_line(idx, d, offset)).await?;
        }
        Commands::Person { action } => person(&client, action).await?,
        Commands::Upload { files } => upload(&client, &files).await?,
        Commands::Config => unreachable!("handled above"),
    }

    Ok(())
}

/// Lay the boxes over the image, apply the requested toggles, and print.
///
/// Boxes stay unplaced until the image's own height is known.
fn show_faces(
    boxes: Vec<BoundingBox>,
    rendered: f32,
    natural: Option<f32>,
    expand: &[usize],
) -> Result<()> {
    for b in &boxes {
        if let Err(e) = b.validate() {
            tracing::warn!(error = %e, "malformed bounding box");
        }
    }
    let mut overlay = Overlay::new(boxes, ImageGeometry::new(rendered, 0.0));
    if let Some(natural) = natural {
        overlay.observe(ImageGeometry::new(rendered, natural));
    }
    let mut selection = SelectionSync::new(overlay.len());
    for &face in expand {
        let group = face.checked_sub(1).context("faces are numbered from 1")?;
        let transition = selection.click_box(group)?;
        tracing::debug!(
            from = ?transition.from,
            to = ?transition.to,
            scroll = ?transition.scroll,
            "selection"
        );
    }
    print!("{}", render::faces(&overlay, &selection));
    Ok(())
}

fn date_range(from: Option<&str>, to: Option<&str>) -> Result<Option<DateRange>> {
    let range = match (from, to) {
        (None, None) => return Ok(None),
        (Some(day), None) | (None, Some(day)) => DateRange::single(parse_day(day)?),
        (Some(from), Some(to)) => DateRange::new(parse_day(from)?, parse_day(to)?)?,
    };
    Ok(Some(range))
}

/// Print pages as they arrive, offering "load more" until the last page.
async fn browse<S: PageSource>(
    loader: &PagedLoader<S>,
    all: bool,
    line: impl Fn(usize, &S::Item) -> String,
) -> Result<()>
where
    S::Item: Clone,
{
    let interactive = std::io::stdin().is_terminal();
    loop {
        let before = loader.len();
        let event = if all {
            loader.load_all().await
        } else {
            loader.load_next().await
        };
        for (idx, item) in loader.items().iter().enumerate().skip(before) {
            println!("{}", line(idx, item));
        }

        match event {
            LoadEvent::Appended { .. } => {}
            LoadEvent::NotFound(None) => bail!("no results found"),
            LoadEvent::NotFound(Some(e)) => bail!("no results found ({e})"),
            LoadEvent::Failed(e) => {
                if all || !interactive {
                    return Err(e).context("loading more results");
                }
                eprintln!("loading more results failed: {e}");
                if !Confirm::new().with_prompt("Retry?").default(true).interact()? {
                    break;
                }
                continue;
            }
            LoadEvent::Skipped | LoadEvent::Stale => break,
        }

        if all || !interactive || !loader.can_load_more() {
            break;
        }
        let prompt = format!("{} shown. Load more?", loader.len());
        if !Confirm::new().with_prompt(prompt).default(true).interact()? {
            break;
        }
    }
    Ok(())
}

async fn person(client: &ApiClient, action: PersonAction) -> Result<()> {
    match action {
        PersonAction::Show { name } => {
            let record = fetch_person(client, &name).await?;
            println!("{}", record.name);
            for (idx, img) in record.images.iter().enumerate() {
                let height = images::natural_height_of_base64(img)
                    .map(|h| format!("{h:.0}px tall"))
                    .unwrap_or_else(|| "unreadable".to_string());
                println!("{:>3}. {} bytes base64, {}", idx + 1, img.len(), height);
            }
        }
        PersonAction::Rename { name, new_name } => {
            let record = fetch_person(client, &name).await?;
            let update = PersonUpdate::replace(normalize_search_name(&new_name), record.images);
            let updated = client
                .update_person(&record.name, &update)
                .await?
                .into_result()
                .context("rename rejected")?;
            println!("renamed {} -> {}", record.name, updated.name);
        }
        PersonAction::AddImages { name, files } => {
            let record = fetch_person(client, &name).await?;
            let new_images = files
                .iter()
                .map(|f| images::read_base64(f))
                .collect::<Result<Vec<_>>>()?;
            let update = PersonUpdate::append(record.name.clone(), new_images);
            let updated = client
                .update_person(&record.name, &update)
                .await?
                .into_result()
                .context("adding images rejected")?;
            println!("{} now has {} images", updated.name, updated.images.len());
        }
        PersonAction::RemoveImage { name, index } => {
            let mut record = fetch_person(client, &name).await?;
            if index == 0 || index > record.images.len() {
                bail!("{} has {} images; no image {index}", record.name, record.images.len());
            }
            record.images.remove(index - 1);
            let update = PersonUpdate::replace(record.name.clone(), record.images);
            let updated = client
                .update_person(&record.name, &update)
                .await?
                .into_result()
                .context("removing image rejected")?;
            println!("{} now has {} images", updated.name, updated.images.len());
        }
        PersonAction::Delete { name, yes } => {
            let name = normalize_search_name(&name);
            if !yes
                && !Confirm::new()
                    .with_prompt(format!("Delete {name}?"))
                    .default(false)
                    .interact()?
            {
                return Ok(());
            }
            match client.delete_person(&name).await? {
                Reply::Data(()) => println!("deleted {name}"),
                Reply::Status(404) => bail!("{name} not found"),
                Reply::Status(code) => bail!("delete {name}: server returned {code}"),
            }
        }
    }
    Ok(())
}

async fn fetch_person(client: &ApiClient, name: &str) -> Result<facelens_core::PersonRecord> {
    let name = normalize_search_name(name);
    match client.get_person(&name).await? {
        Reply::Data(Some(record)) => Ok(record),
        Reply::Data(None) | Reply::Status(404) => bail!("{name} not found"),
        Reply::Status(code) => bail!("{name}: server returned {code}"),
    }
}

async fn upload(client: &ApiClient, files: &[PathBuf]) -> Result<()> {
    let photos = images::load_named_photos(files)?;
    let groups = group_uploads(photos);
    if groups.is_empty() {
        bail!("no photos with a usable person name");
    }
    let total = groups.len();
    println!("submitting {} photos for {} people", files.len(), total);

    let (outcomes, _tracker) = submit_groups(client, groups, |outcome, tracker| {
        let status = match &outcome.result {
            Ok(Reply::Data(_)) => "ok".to_string(),
            Ok(Reply::Status(code)) => format!("rejected ({code})"),
            Err(e) => format!("failed ({e})"),
        };
        println!(
            "[{}/{}] {}: {} images {}",
            tracker.finished_count(),
            tracker.len(),
            outcome.name,
            outcome.images,
            status
        );
    })
    .await;

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    if failed > 0 {
        bail!("{failed} of {total} groups failed to upload");
    }
    Ok(())
}
