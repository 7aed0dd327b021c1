use std::fs::File;
use std::path::Path;

use id3::TagLike;
use log::{debug, warn};
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::{FormatOptions, Track};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Rough bitrate assumption used when the decoder cannot tell us anything.
const FALLBACK_BYTES_PER_SECOND: u64 = 16_000;

pub fn estimate_from_size(file_size: u64) -> i32 {
    (file_size / FALLBACK_BYTES_PER_SECOND) as i32
}

/// Decode-level duration probe. Returns None whenever the file cannot be
/// opened, probed, or lacks frame/timebase information.
pub fn probe_duration(path: &Path) -> Option<i32> {
    let src = File::open(path).ok()?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }
    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();

    let probed = match symphonia::default::get_probe().format(&hint, mss, &fmt_opts, &meta_opts) {
        Ok(probed) => probed,
        Err(err) => {
            warn!("could not probe {}: {}", path.display(), err);
            return None;
        }
    };

    let track = first_supported_track(probed.format.tracks())?;
    let params = &track.codec_params;
    let n_frames = params.n_frames?;
    let time_base = params.time_base?;
    let time = time_base.calc_time(n_frames);
    Some(time.seconds as i32)
}

fn first_supported_track(tracks: &[Track]) -> Option<&Track> {
    tracks
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
}

/// Probe first, fall back to the byte-size heuristic when the probe fails.
pub fn duration_or_estimate(path: &Path, file_size: u64) -> i32 {
    match probe_duration(path) {
        Some(seconds) if seconds > 0 => seconds,
        _ => {
            debug!(
                "falling back to size heuristic for {} ({} bytes)",
                path.display(),
                file_size
            );
            estimate_from_size(file_size)
        }
    }
}

/// Pull a genre out of the file's ID3 tag, if there is one worth keeping.
pub fn genre_from_tags(path: &Path) -> Option<String> {
    let tag = id3::Tag::read_from_path(path).ok()?;
    tag.genre()
        .map(|g| g.replace(char::from(0), "?"))
        .filter(|g| !g.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn size_heuristic_matches_sixteen_kilobytes_per_second() {
        assert_eq!(estimate_from_size(0), 0);
        assert_eq!(estimate_from_size(16_000), 1);
        assert_eq!(estimate_from_size(3_200_000), 200);
    }

    #[test]
    fn probe_of_missing_file_is_none() {
        assert_eq!(probe_duration(&PathBuf::from("/no/such/file.mp3")), None);
    }

    #[test]
    fn missing_file_falls_back_to_estimate() {
        let d = duration_or_estimate(&PathBuf::from("/no/such/file.mp3"), 160_000);
        assert_eq!(d, 10);
    }

    #[test]
    fn genre_of_missing_file_is_none() {
        assert_eq!(genre_from_tags(&PathBuf::from("/no/such/file.mp3")), None);
    }
}
