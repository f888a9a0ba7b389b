use crate::{
    error::{AppError, AppResult},
    models::WatchlistItem,
};

const CSV_HEADER: [&str; 7] = ["Type", "ID", "Title", "Added", "Watched", "Rating", "Poster"];

pub fn to_json(items: &[WatchlistItem]) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(items)?)
}

pub fn to_csv(items: &[WatchlistItem]) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(csv_error)?;

    for item in items {
        let rating = if item.rating > 0.0 {
            format!("{:.1}", item.rating)
        } else {
            String::new()
        };
        let added = item.added_at.format("%Y-%m-%d").to_string();

        writer
            .write_record([
                item.media_type.as_str(),
                item.id.as_str(),
                item.title.as_str(),
                added.as_str(),
                if item.watched { "Yes" } else { "No" },
                rating.as_str(),
                item.poster_path.as_str(),
            ])
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV encoding failed: {}", e)))
}

fn csv_error(e: csv::Error) -> AppError {
    AppError::Internal(format!("CSV write failed: {}", e))
}
