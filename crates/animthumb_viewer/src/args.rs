use std::collections::BTreeSet;
use std::path::PathBuf;

use animthumb::PlaybackMode;
use tracing::error;

const DEFAULT_THUMB_SIZE: f32 = 128.0;

pub struct Args {
    pub paths: Vec<PathBuf>,
    /// overrides the stored setting for this session only
    pub mode: Option<PlaybackMode>,
    pub thumb_size: f32,
    pub datapath: Option<String>,
}

impl Args {
    // parse arguments, return set of unrecognized args
    pub fn parse(args: &[String]) -> (Self, BTreeSet<String>) {
        let mut unrecognized_args = BTreeSet::new();
        let mut res = Args {
            paths: vec![],
            mode: None,
            thumb_size: DEFAULT_THUMB_SIZE,
            datapath: None,
        };

        let mut i = 0;
        let len = args.len();
        while i < len {
            let arg = &args[i];

            if arg == "--mode" {
                i += 1;
                let Some(mode) = args.get(i) else {
                    error!("mode argument missing?");
                    continue;
                };
                match mode.parse::<PlaybackMode>() {
                    Ok(mode) => res.mode = Some(mode),
                    Err(_) => error!(
                        "unknown mode '{mode}', expected never, on-hover, on-select or always"
                    ),
                }
            } else if arg == "--size" {
                i += 1;
                let Some(size) = args.get(i) else {
                    error!("size argument missing?");
                    continue;
                };
                match size.parse::<f32>() {
                    Ok(size) if size > 0.0 => res.thumb_size = size,
                    _ => error!("invalid thumbnail size '{size}'"),
                }
            } else if arg == "--datapath" {
                i += 1;
                let Some(path) = args.get(i) else {
                    error!("datapath argument missing?");
                    continue;
                };
                res.datapath = Some(path.clone());
            } else if arg.starts_with("--") {
                unrecognized_args.insert(arg.clone());
            } else {
                res.paths.push(PathBuf::from(arg));
            }

            i += 1;
        }

        (res, unrecognized_args)
    }
}
