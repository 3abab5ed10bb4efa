use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "ytcards",
    version,
    about = "Turn a YouTube playlist into a markdown checklist of link cards"
)]
pub struct Cli {
    /// Playlist URL, e.g. https://www.youtube.com/playlist?list=PL...
    pub url: String,

    /// Output markdown file (default: derived from the playlist title)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Directory the output file is written into
    #[arg(short = 'C', long, default_value = "output")]
    pub out_dir: PathBuf,

    /// Print cards to stdout instead of writing a file
    #[arg(long)]
    pub stdout: bool,

    /// Overwrite an existing output file
    #[arg(long)]
    pub force: bool,

    /// Name the output file after the playlist id instead of its title
    #[arg(long)]
    pub id_filename: bool,

    /// Reuse pages cached on disk from a previous run (refreshed after a day)
    #[arg(long)]
    pub cached: bool,
}
