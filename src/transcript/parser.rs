use tracing::debug;

use crate::article::Segment;
use crate::error::TranscriptError;
use crate::timecode::parse_timestamp;

/// Parse an oracle response into segments, in file order, with
/// monotonically increasing synthetic ids.
///
/// Lines that don't match the `[start -> end] text| translation` grammar
/// are skipped. No sorting or interval validation happens here; that is
/// the reviewer's job. A response with zero well-formed lines is a hard
/// failure: the caller must not create an empty practice set.
pub fn parse_transcript(raw: &str) -> Result<Vec<Segment>, TranscriptError> {
    let mut segments = Vec::new();

    for line in raw.lines() {
        match parse_line(line, segments.len() as u32) {
            Some(segment) => segments.push(segment),
            None => {
                if !line.trim().is_empty() {
                    debug!("skipping malformed transcript line: {}", line);
                }
            }
        }
    }

    if segments.is_empty() {
        return Err(TranscriptError::Empty);
    }

    Ok(segments)
}

fn parse_line(line: &str, id: u32) -> Option<Segment> {
    let line = line.trim();
    let rest = line.strip_prefix('[')?;
    let (range, body) = rest.split_once(']')?;
    let (start_text, end_text) = range.split_once("->")?;

    let text = body.trim();
    if text.is_empty() {
        return None;
    }

    let (text, translation) = match text.split_once('|') {
        Some((t, tr)) => {
            let tr = tr.trim();
            (t.trim(), (!tr.is_empty()).then(|| tr.to_string()))
        }
        None => (text, None),
    };
    if text.is_empty() {
        return None;
    }

    Some(Segment {
        id,
        text: text.to_string(),
        translation,
        start: parse_timestamp(start_text),
        end: parse_timestamp(end_text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_lines_in_order() {
        let raw = "\
[00:00.000 -> 00:02.500] Hello there.| Bonjour.
[00:02.500 -> 00:05.000] How are you today?| Comment allez-vous ?
";
        let segments = parse_transcript(raw).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].id, 0);
        assert_eq!(segments[0].text, "Hello there.");
        assert_eq!(segments[0].translation.as_deref(), Some("Bonjour."));
        assert_eq!(segments[0].start, 0.0);
        assert_eq!(segments[0].end, 2.5);
        assert_eq!(segments[1].id, 1);
        assert!(segments[1].start < segments[1].end);
    }

    #[test]
    fn translation_is_optional() {
        let raw = "[00:00.000 -> 00:01.000] No translation here";
        let segments = parse_transcript(raw).unwrap();
        assert_eq!(segments[0].translation, None);
        assert_eq!(segments[0].text, "No translation here");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let raw = "\
preamble chatter from the model
[00:00.000 -> 00:01.500] Good line.| Bonne ligne.
[broken line without arrow] nope
[00:01.500 -> ] missing end is still a line with two timestamps? no arrow target
";
        let segments = parse_transcript(raw).unwrap();
        // The third line has no `->`; the fourth parses with a lenient 0.0 end.
        assert_eq!(segments[0].text, "Good line.");
        assert!(segments.iter().all(|s| !s.text.is_empty()));
    }

    #[test]
    fn wholly_unparseable_response_is_fatal() {
        let raw = "Sorry, I could not process this audio.";
        assert!(matches!(
            parse_transcript(raw),
            Err(TranscriptError::Empty)
        ));
    }

    #[test]
    fn empty_response_is_fatal() {
        assert!(matches!(parse_transcript(""), Err(TranscriptError::Empty)));
    }

    #[test]
    fn ids_increase_monotonically_across_skips() {
        let raw = "\
[0 -> 1] one
garbage
[1 -> 2] two
";
        let segments = parse_transcript(raw).unwrap();
        assert_eq!(segments[0].id, 0);
        assert_eq!(segments[1].id, 1);
    }
}
