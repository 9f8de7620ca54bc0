//! Quick-XML based XMLTV importer
//!
//! Streams an XMLTV document into [`Station`]s carrying sorted programme
//! schedules, ready to be merged into the broadcast-collected data.

use chrono::{Duration, NaiveDateTime};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use crate::errors::{AppError, AppResult, SourceError, SourceResult};
use crate::models::{ProgrammeEntry, Station};
use crate::utils::duration_serde::MAX_DURATION_SECONDS;
use crate::utils::time::{parse_xmltv_timestamp, SourceTimezone};

type Attributes = HashMap<String, String>;

/// An open element: its name and attributes
type Element = (String, Attributes);

/// Per-file settings applied while importing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImportSettings {
    pub timezone: SourceTimezone,
    /// Shift applied after timezone conversion
    pub time_offset: Duration,
    pub use_name_for_merge: bool,
    pub no_lookup: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            timezone: SourceTimezone::default(),
            time_offset: Duration::zero(),
            use_name_for_merge: false,
            no_lookup: false,
        }
    }
}

impl ImportSettings {
    /// Convert an XMLTV timestamp into the local time used for schedules
    pub fn convert(&self, value: &str) -> SourceResult<NaiveDateTime> {
        Ok(parse_xmltv_timestamp(value, &self.timezone)? + self.time_offset)
    }
}

/// Result of importing one XMLTV document
#[derive(Debug, Clone, Default)]
pub struct XmltvImport {
    pub stations: Vec<Station>,
    /// Programmes whose channel was never declared
    pub skipped_programmes: usize,
    /// Programmes dropped for repeating a start time on their channel
    pub duplicates_dropped: usize,
}

impl XmltvImport {
    pub fn programme_count(&self) -> usize {
        self.stations.iter().map(|s| s.programmes.len()).sum()
    }
}

struct PendingChannel {
    id: String,
    name: Option<String>,
}

struct PendingProgramme {
    channel: String,
    stop: Option<NaiveDateTime>,
    entry: ProgrammeEntry,
}

struct XmltvParser<'s> {
    settings: &'s ImportSettings,
    channel_id_pattern: Regex,
    stations: Vec<Station>,
    channel_index: HashMap<String, usize>,
    programmes: Vec<PendingProgramme>,
    channel: Option<PendingChannel>,
    programme: Option<PendingProgramme>,
}

/// Parse XMLTV content using the streaming quick-xml reader
pub fn parse_xmltv(content: &str, settings: &ImportSettings) -> AppResult<XmltvImport> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut parser = XmltvParser::new(settings)?;
    let mut stack: Vec<Element> = Vec::new();
    let mut current_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = element_name(e)?;
                let attrs = parse_attributes(e);
                parser.open_element(&name, &attrs)?;

                stack.push((name, attrs));
                current_text.clear();
            }

            Ok(Event::End(_)) => {
                if let Some((name, attrs)) = stack.pop() {
                    let text = std::mem::take(&mut current_text);
                    parser.close_element(&name, &attrs, stack.last(), text.trim())?;
                }
            }

            Ok(Event::Empty(ref e)) => {
                let name = element_name(e)?;
                let attrs = parse_attributes(e);
                parser.open_element(&name, &attrs)?;
                parser.close_element(&name, &attrs, stack.last(), "")?;
            }

            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| AppError::source_error(format!("Invalid text content: {e}")))?;
                current_text.push_str(&text);
            }

            Ok(Event::CData(e)) => {
                let text = std::str::from_utf8(&e)
                    .map_err(|e| AppError::source_error(format!("Invalid UTF-8 in CDATA: {e}")))?;
                current_text.push_str(text);
            }

            Ok(Event::Eof) => break,

            Err(e) => {
                return Err(AppError::source_error(format!(
                    "XML parsing error at position {}: {e}",
                    reader.buffer_position()
                )));
            }

            _ => {}
        }
    }

    Ok(parser.finish())
}

/// Read and parse an XMLTV file
pub async fn load_import_file(path: &Path, settings: &ImportSettings) -> AppResult<XmltvImport> {
    let content = tokio::fs::read_to_string(path).await?;
    let import = parse_xmltv(&content, settings)?;

    info!(
        "Loaded {} channels with {} programmes from {}",
        import.stations.len(),
        import.programme_count(),
        path.display()
    );
    Ok(import)
}

impl<'s> XmltvParser<'s> {
    fn new(settings: &'s ImportSettings) -> AppResult<Self> {
        let channel_id_pattern = Regex::new(r"^(-?\d+)[.:](-?\d+)[.:](-?\d+)$")
            .map_err(|e| AppError::configuration(format!("Invalid regex: {e}")))?;

        Ok(Self {
            settings,
            channel_id_pattern,
            stations: Vec::new(),
            channel_index: HashMap::new(),
            programmes: Vec::new(),
            channel: None,
            programme: None,
        })
    }

    fn open_element(&mut self, name: &str, attrs: &Attributes) -> AppResult<()> {
        match name {
            "channel" => {
                self.channel = Some(PendingChannel {
                    id: attrs.get("id").cloned().unwrap_or_default(),
                    name: None,
                });
            }
            "programme" => {
                let start = attrs
                    .get("start")
                    .ok_or_else(|| SourceError::invalid_timestamp("", "programme without start time"))?;
                let start = self.settings.convert(start)?;
                let stop = attrs
                    .get("stop")
                    .map(|stop| self.settings.convert(stop))
                    .transpose()?;

                let mut entry = ProgrammeEntry::new(start, Duration::zero(), "");
                entry.no_lookup = self.settings.no_lookup;

                self.programme = Some(PendingProgramme {
                    channel: attrs.get("channel").cloned().unwrap_or_default(),
                    stop,
                    entry,
                });
            }
            _ => {}
        }
        Ok(())
    }

    fn close_element(
        &mut self,
        name: &str,
        attrs: &Attributes,
        parent: Option<&Element>,
        text: &str,
    ) -> AppResult<()> {
        match name {
            "channel" => {
                self.finish_channel();
                return Ok(());
            }
            "programme" => {
                if let Some(programme) = self.programme.take() {
                    self.programmes.push(programme);
                }
                return Ok(());
            }
            _ => {}
        }

        if let Some(channel) = self.channel.as_mut() {
            if name == "display-name" && channel.name.is_none() && !text.is_empty() {
                channel.name = Some(text.to_string());
            }
            return Ok(());
        }

        let settings = self.settings;
        let Some(programme) = self.programme.as_mut() else {
            return Ok(());
        };
        let entry = &mut programme.entry;
        let parent_name = parent.map(|(name, _)| name.as_str());

        match (name, parent_name) {
            ("title", _) => {
                if entry.event_name.is_empty() {
                    entry.event_name = text.to_string();
                }
            }
            ("sub-title", _) => set_first(&mut entry.subtitle, text),
            ("desc", _) => {
                if entry.short_description.is_none() {
                    set_first(&mut entry.short_description, text);
                } else {
                    set_first(&mut entry.extended_description, text);
                }
            }
            ("category", _) => set_first(&mut entry.event_category, text),
            ("date", _) => set_first(&mut entry.date, text),
            ("country", _) => set_first(&mut entry.country, text),
            ("language", _) => set_first(&mut entry.language_code, text),

            ("director", Some("credits")) => push_text(&mut entry.credits.directors, text),
            ("producer", Some("credits")) => push_text(&mut entry.credits.producers, text),
            ("actor", Some("credits")) => push_text(&mut entry.credits.cast, text),
            ("writer", Some("credits")) => push_text(&mut entry.credits.writers, text),
            ("guest", Some("credits")) => push_text(&mut entry.credits.guest_stars, text),
            ("presenter", Some("credits")) => push_text(&mut entry.credits.presenters, text),

            ("episode-num", _) => match attrs.get("system").map(String::as_str) {
                Some("xmltv_ns") => apply_xmltv_ns(entry, text),
                Some("dd_progid") => apply_dd_progid(entry, text),
                _ => {}
            },
            ("value", Some("rating")) => {
                if entry.parental_rating.is_none() && !text.is_empty() {
                    entry.parental_rating = Some(text.to_string());
                    entry.parental_rating_system =
                        parent.and_then(|(_, attrs)| attrs.get("system").cloned());
                }
            }
            ("value", Some("star-rating")) => set_first(&mut entry.star_rating, text),
            ("quality", Some("video")) => set_first(&mut entry.video_quality, text),
            ("aspect", Some("video")) => set_first(&mut entry.aspect_ratio, text),
            ("stereo", Some("audio")) => set_first(&mut entry.audio_quality, text),
            ("subtitles", _) => {
                if entry.subtitles.is_none() {
                    entry.subtitles = Some(attrs.get("type").cloned().unwrap_or_else(|| "yes".to_string()));
                }
            }
            ("previously-shown", _) => {
                if let Some(start) = attrs.get("start") {
                    entry.previous_play_date = Some(settings.convert(start)?);
                }
            }
            _ => {}
        }

        Ok(())
    }

    fn finish_channel(&mut self) {
        let Some(channel) = self.channel.take() else {
            return;
        };
        if self.channel_index.contains_key(&channel.id) {
            warn!("Ignoring repeated declaration of channel '{}'", channel.id);
            return;
        }

        let mut station = Station::new(channel.name.unwrap_or_else(|| channel.id.clone()));
        station.use_name_for_merge = self.settings.use_name_for_merge;
        if let Some(ids) = self.channel_id_pattern.captures(&channel.id) {
            station.original_network_id = parse_identifier(&ids[1]);
            station.transport_stream_id = parse_identifier(&ids[2]);
            station.service_id = parse_identifier(&ids[3]);
        }

        self.channel_index.insert(channel.id, self.stations.len());
        self.stations.push(station);
    }

    fn finish(self) -> XmltvImport {
        let mut stations = self.stations;
        let mut grouped: Vec<Vec<PendingProgramme>> = stations.iter().map(|_| Vec::new()).collect();

        let mut skipped_programmes = 0;
        for programme in self.programmes {
            match self.channel_index.get(&programme.channel) {
                Some(&index) => grouped[index].push(programme),
                None => skipped_programmes += 1,
            }
        }
        if skipped_programmes > 0 {
            warn!(
                "Skipped {} programmes referencing undeclared channels",
                skipped_programmes
            );
        }

        let mut duplicates_dropped = 0;
        for (station, pending) in stations.iter_mut().zip(grouped) {
            let (programmes, dropped) = build_schedule(station, pending);
            station.programmes = programmes;
            duplicates_dropped += dropped;
        }

        XmltvImport {
            stations,
            skipped_programmes,
            duplicates_dropped,
        }
    }
}

/// Sort a channel's programmes, drop repeated start times and fill in durations
fn build_schedule(station: &Station, mut pending: Vec<PendingProgramme>) -> (Vec<ProgrammeEntry>, usize) {
    pending.sort_by_key(|p| p.entry.start);

    let mut kept: Vec<PendingProgramme> = Vec::with_capacity(pending.len());
    let mut dropped = 0;
    for programme in pending {
        if kept.last().is_some_and(|last| last.entry.start == programme.entry.start) {
            warn!(
                "Dropping duplicate programme '{}' at {} on {}",
                programme.entry.event_name, programme.entry.start, station
            );
            dropped += 1;
            continue;
        }
        kept.push(programme);
    }

    let starts: Vec<NaiveDateTime> = kept.iter().map(|p| p.entry.start).collect();
    let programmes = kept
        .into_iter()
        .enumerate()
        .map(|(index, programme)| {
            let mut entry = programme.entry;
            entry.duration = match programme.stop {
                Some(stop) if stop >= entry.start => stop - entry.start,
                Some(stop) => {
                    warn!(
                        "Programme '{}' on {} stops at {} before it starts, using zero duration",
                        entry.event_name, station, stop
                    );
                    Duration::zero()
                }
                None => starts
                    .get(index + 1)
                    .map(|next| *next - entry.start)
                    .unwrap_or_else(Duration::zero),
            };
            if entry.duration > Duration::seconds(MAX_DURATION_SECONDS) {
                warn!(
                    "Programme '{}' on {} runs for {} hours, using zero duration",
                    entry.event_name,
                    station,
                    entry.duration.num_hours()
                );
                entry.duration = Duration::zero();
            }
            entry
        })
        .collect();

    (programmes, dropped)
}

/// `-1` and out-of-range values leave the identifier unset
fn parse_identifier(value: &str) -> Option<u16> {
    value.parse::<u16>().ok()
}

fn set_first(slot: &mut Option<String>, text: &str) {
    if slot.is_none() && !text.is_empty() {
        *slot = Some(text.to_string());
    }
}

fn push_text(list: &mut Vec<String>, text: &str) {
    if !text.is_empty() {
        list.push(text.to_string());
    }
}

/// `season.episode.part`, each zero-based and optionally `/total`
fn apply_xmltv_ns(entry: &mut ProgrammeEntry, value: &str) {
    let mut parts = value.split('.').map(|part| {
        part.split('/')
            .next()
            .and_then(|number| number.trim().parse::<u32>().ok())
            .map(|number| number + 1)
    });

    let season = parts.next().flatten();
    let episode = parts.next().flatten();
    let part = parts.next().flatten();

    if entry.season_number.is_none() {
        entry.season_number = season;
    }
    if entry.episode_number.is_none() {
        entry.episode_number = episode;
    }
    if entry.part_number.is_none() {
        entry.part_number = part.map(|p| p.to_string());
    }
}

/// `SERIESID.EPISODEID`
fn apply_dd_progid(entry: &mut ProgrammeEntry, value: &str) {
    let mut parts = value.splitn(2, '.').map(str::trim);
    if let Some(series) = parts.next() {
        set_first(&mut entry.series_id, series);
    }
    if let Some(episode) = parts.next() {
        set_first(&mut entry.episode_id, episode);
    }
}

fn element_name(element: &BytesStart) -> AppResult<String> {
    std::str::from_utf8(element.name().as_ref())
        .map(str::to_string)
        .map_err(|e| AppError::source_error(format!("Invalid UTF-8 in XML element name: {e}")))
}

/// Parse XML attributes into a HashMap
fn parse_attributes(element: &BytesStart) -> Attributes {
    let mut attrs = HashMap::new();

    for attr in element.attributes().flatten() {
        if let (Ok(key), Ok(value)) = (std::str::from_utf8(attr.key.as_ref()), attr.unescape_value()) {
            attrs.insert(key.to_string(), value.into_owned());
        }
    }
    attrs
}
