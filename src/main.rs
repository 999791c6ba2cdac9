/*
 * fishspeak
 * Turns a line of text into an Opus/OGG voice clip: the text goes to the
 * Fish Audio TTS API, the MP3 it streams back is written to disk, ffmpeg
 * re-encodes it to Opus in an OGG container and the MP3 is removed.
 *
 * Usage: fishspeak "text" out.mp3   (writes out.ogg)
 *
 * Settings come from the environment or a .env file, FISH_API_KEY and
 * FISH_MODEL_ID are required.
 *
 * MIT License
*/

use clap::Parser;
use fishspeak::args::Args;
use fishspeak::pipeline::{ogg_path_for, Pipeline};
use fishspeak::transcode::Transcoder;
use log::debug;

#[tokio::main]
async fn main() {
    // Read .env file
    dotenv::dotenv().ok();

    // Parse command line arguments, a usage error exits 1 like any other validation failure
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    // Initialize logging at --loglevel unless RUST_LOG says otherwise
    let _ = env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .try_init();

    let credentials = match args.credentials() {
        Ok(credentials) => credentials,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let request = match args.request() {
        Ok(request) => request,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = ogg_path_for(&args.output) {
        eprintln!("❌ {}", e);
        eprintln!("Usage: fishspeak 'text' 'output.mp3'");
        std::process::exit(1);
    }

    debug!("Using voice model {} at {}", credentials.model_id, args.api_url);

    let pipeline = Pipeline::new(credentials, args.api_url.clone(), Transcoder::new(&args.ffmpeg));
    match pipeline.generate_audio(&request, &args.output).await {
        Ok(ogg) => {
            println!("{}", ogg.display());
        }
        Err(e) => {
            debug!("Audio generation failed: {:?}", e);
            eprintln!("❌ Error generating audio:");
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
