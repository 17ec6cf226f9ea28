//! Replays dumped detections through the tracker and prints every frame's
//! tracks as JSON.
//!
//! Usage: `replay <detections> [wingspans.txt] [config.json]`, where each
//! detections line is `<frame index>:<json array of raw detections>`.

use std::io::BufRead;

use flocktrack::{FrameProcessor, RawDetection, TrackStore, TrackerConfig, WingspanTable};

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);

    let in_file_name = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("expected detections file name"))?;
    let wingspans = args
        .next()
        .map(WingspanTable::load_or_empty)
        .unwrap_or_default();
    let config = match args.next() {
        Some(path) => TrackerConfig::from_json_file(path)?,
        None => TrackerConfig::default(),
    };

    let processor = FrameProcessor::new(config, wingspans);
    let mut store = TrackStore::new();

    let dets_file = std::fs::File::open(in_file_name)?;
    for (lineno, line) in std::io::BufReader::new(dets_file).lines().enumerate() {
        let line = line?;
        let Some((index, vector)) = line.split_once(':') else {
            eprintln!("line {}: wrong file format", lineno + 1);
            continue;
        };

        let index: usize = index.trim().parse()?;
        let raw: Vec<RawDetection> = serde_json::from_str(vector)?;
        let rows = processor.process(&mut store, index, raw);

        println!("{index}:{}", serde_json::to_string(&rows)?);
    }

    Ok(())
}
