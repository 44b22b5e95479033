use alertkit::AnimationKind;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "alertkit", version, about = "Interactive showcase of alertkit alerts")]
pub struct Args {
    /// Animation for every alert (e.g. "fade", "slide-left", "tumble")
    #[arg(short, long)]
    pub animation: Option<AnimationKind>,

    /// Skip animations and present alerts instantly
    #[arg(long)]
    pub reduced_motion: bool,

    /// Darken the screen behind alerts
    #[arg(long)]
    pub darken: bool,

    /// Blur the screen behind alerts
    #[arg(long)]
    pub blur: bool,

    /// Theme name (e.g. "Catppuccin Latte")
    #[arg(short, long)]
    pub theme: Option<String>,
}
