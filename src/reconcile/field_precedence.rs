//! Field-level conflict resolution for programmes present in both sources

use crate::models::{Precedence, ProgrammeEntry};
use crate::utils::has_text;

/// Resolve `incoming` into `existing` for two entries with the same start time.
///
/// With [`Precedence::File`] every field the incoming entry actually carries
/// replaces the existing value and `no_lookup` is taken from the incoming
/// entry. With [`Precedence::Broadcast`] the existing fields are kept as they
/// are and only `no_lookup` is cleared, so the merged entry becomes eligible
/// for metadata lookup again.
///
/// Paired fields (rating + rating system, video quality + aspect ratio) are
/// always written together.
pub fn merge_fields(existing: &mut ProgrammeEntry, incoming: &ProgrammeEntry, precedence: Precedence) {
    if precedence == Precedence::Broadcast {
        existing.no_lookup = false;
        return;
    }

    if !incoming.event_name.trim().is_empty() {
        existing.event_name = incoming.event_name.clone();
    }

    copy_text(&mut existing.short_description, &incoming.short_description);
    copy_text(&mut existing.extended_description, &incoming.extended_description);
    copy_text(&mut existing.subtitle, &incoming.subtitle);
    copy_text(&mut existing.date, &incoming.date);
    copy_text(&mut existing.event_category, &incoming.event_category);

    if has_text(&incoming.parental_rating) || has_text(&incoming.parental_rating_system) {
        existing.parental_rating = incoming.parental_rating.clone();
        existing.parental_rating_system = incoming.parental_rating_system.clone();
    }

    if has_text(&incoming.video_quality) || has_text(&incoming.aspect_ratio) {
        existing.video_quality = incoming.video_quality.clone();
        existing.aspect_ratio = incoming.aspect_ratio.clone();
    }

    copy_text(&mut existing.audio_quality, &incoming.audio_quality);
    copy_text(&mut existing.star_rating, &incoming.star_rating);
    copy_text(&mut existing.subtitles, &incoming.subtitles);

    if incoming.previous_play_date.is_some() {
        existing.previous_play_date = incoming.previous_play_date;
    }

    copy_text(&mut existing.series_id, &incoming.series_id);
    copy_text(&mut existing.episode_id, &incoming.episode_id);
    copy_text(&mut existing.part_number, &incoming.part_number);

    if incoming.season_number.is_some() {
        existing.season_number = incoming.season_number;
    }
    if incoming.episode_number.is_some() {
        existing.episode_number = incoming.episode_number;
    }

    copy_list(&mut existing.credits.directors, &incoming.credits.directors);
    copy_list(&mut existing.credits.producers, &incoming.credits.producers);
    copy_list(&mut existing.credits.cast, &incoming.credits.cast);
    copy_list(&mut existing.credits.writers, &incoming.credits.writers);
    copy_list(&mut existing.credits.guest_stars, &incoming.credits.guest_stars);
    copy_list(&mut existing.credits.presenters, &incoming.credits.presenters);

    copy_text(&mut existing.country, &incoming.country);
    copy_text(&mut existing.language_code, &incoming.language_code);

    existing.no_lookup = incoming.no_lookup;
}

fn copy_text(target: &mut Option<String>, incoming: &Option<String>) {
    if has_text(incoming) {
        target.clone_from(incoming);
    }
}

fn copy_list(target: &mut Vec<String>, incoming: &[String]) {
    if !incoming.is_empty() {
        *target = incoming.to_vec();
    }
}
