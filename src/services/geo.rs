use crate::error::{AppError, AppResult};

const EARTH_RADIUS_KM: f64 = 6371.0;
const KM_PER_DEGREE_LAT: f64 = 111.0;

/// Parses and range-checks a latitude/longitude pair taken from a query string.
pub fn parse_coordinates(latitude: Option<&str>, longitude: Option<&str>) -> AppResult<(f64, f64)> {
    let (Some(lat), Some(lon)) = (
        latitude.map(str::trim).filter(|s| !s.is_empty()),
        longitude.map(str::trim).filter(|s| !s.is_empty()),
    ) else {
        return Err(AppError::validation(
            "Invalid request - include latitude and longitude in URL parameters",
        ));
    };

    let invalid = || {
        AppError::validation(
            "Invalid request - latitude and longitude must be valid \
             (-90 <= latitude <= 90 and -180 <= longitude <= 180)",
        )
    };
    let lat: f64 = lat.parse().map_err(|_| invalid())?;
    let lon: f64 = lon.parse().map_err(|_| invalid())?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(invalid());
    }
    Ok((lat, lon))
}

pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let to_rad = |deg: f64| deg.to_radians();
    let dlat = to_rad(lat2 - lat1);
    let dlon = to_rad(lon2 - lon1);
    let a = (dlat / 2.0).sin().powi(2)
        + to_rad(lat1).cos() * to_rad(lat2).cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Coarse box around a point, used to narrow the SQL scan before the exact
/// distance check. Returns (min_lat, max_lat, min_lon, max_lon); a box that
/// crosses the antimeridian comes back with `min_lon > max_lon`.
pub fn bounding_box(lat: f64, lon: f64, radius_km: f64) -> (f64, f64, f64, f64) {
    let lat_change = radius_km / KM_PER_DEGREE_LAT;
    let lon_change = (radius_km / KM_PER_DEGREE_LAT) / lat.to_radians().cos().abs();
    let min_lat = lat - lat_change;
    let max_lat = lat + lat_change;

    // Near the poles every longitude is close.
    let reaches_pole = min_lat <= -90.0 || max_lat >= 90.0;
    let (min_lon, max_lon) = if !reaches_pole && lon_change.is_finite() && lon_change < 180.0 {
        (wrap_longitude(lon - lon_change), wrap_longitude(lon + lon_change))
    } else {
        (-180.0, 180.0)
    };

    (min_lat.max(-90.0), max_lat.min(90.0), min_lon, max_lon)
}

fn wrap_longitude(lon: f64) -> f64 {
    if lon < -180.0 {
        lon + 360.0
    } else if lon > 180.0 {
        lon - 360.0
    } else {
        lon
    }
}
