use tracing::warn;

use crate::models::{FixerRecord, JobOffer, STATUS_CANCELLED, STATUS_COMPLETED};
use crate::services::fixer_api::{FixerApi, FixerApiError};
use crate::services::fixer_map_service::FixerMapView;

pub const DEFAULT_JOB_LAT: f64 = -17.3935;
pub const DEFAULT_JOB_LNG: f64 = -66.1468;

const DEFAULT_CITY: &str = "Cochabamba";
const DEFAULT_RATING: f64 = 4.8;
const DEFAULT_BIO: &str = "Técnico con experiencia en reparaciones del hogar.";
const DEFAULT_JOIN_DATE: &str = "2024-01-01";
const DEFAULT_JOB_ADDRESS: &str = "Zona no especificada";
const PLACEHOLDER_PHOTO: &str = "/assets/img/placeholder-user.svg";

pub struct FixerProfileView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub whatsapp_digits: String,
    pub photo_url: String,
    pub city: String,
    pub rating: f64,
    pub bio: String,
    pub join_date_label: String,
    pub services: Vec<String>,
    pub payment_methods: Vec<String>,
    pub completed_jobs: usize,
    pub cancelled_jobs: usize,
    pub total_jobs: usize,
    pub jobs: Vec<JobOfferCardView>,
    pub map: Option<FixerMapView>,
}

pub struct JobOfferCardView {
    pub title: String,
    pub description: String,
    pub price_label: String,
    pub status: String,
    pub status_label: String,
    pub tags: Vec<String>,
    pub date_label: String,
    pub address_label: String,
    pub lat: f64,
    pub lng: f64,
    pub photo_url: String,
}

pub async fn load_fixer_profile_view(
    api: &FixerApi,
    fixer_id: &str,
) -> Result<Option<FixerProfileView>, FixerApiError> {
    let (fixer, jobs) = tokio::join!(
        api.get_fixer_by_id(fixer_id),
        api.get_jobs_by_fixer(fixer_id)
    );

    let Some(record) = fixer? else {
        return Ok(None);
    };

    // Only the profile feed gates the page; a failing jobs feed degrades to
    // an empty history.
    let jobs = match jobs {
        Ok(jobs) => jobs,
        Err(err) => {
            warn!(status = %err.status, fixer_id, "fixer_jobs_feed_failed");
            Vec::new()
        }
    };

    Ok(Some(build_view(record, jobs)))
}

fn build_view(record: FixerRecord, jobs: Vec<JobOffer>) -> FixerProfileView {
    let FixerRecord { user, profile } = record;

    // The widget gets the raw photo; it stands in its own generic icon when
    // there is none. The header photo falls back to the bundled placeholder.
    let map = FixerMapView::from_location(
        profile.location.as_ref(),
        &user.name,
        profile.photo_url.as_deref(),
    );

    let photo_url = profile
        .photo_url
        .as_deref()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_PHOTO.to_string());

    let services: Vec<String> = profile
        .services
        .iter()
        .map(|svc| svc.name.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let payment_methods: Vec<String> = profile
        .payment_methods
        .iter()
        .map(|pm| format_payment_label(&pm.kind))
        .collect();

    let bio = profile
        .additional_info
        .as_ref()
        .and_then(|info| info.bio.as_deref())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_BIO.to_string());

    let completed_jobs = count_with_status(&jobs, STATUS_COMPLETED);
    let cancelled_jobs = count_with_status(&jobs, STATUS_CANCELLED);
    let jobs_view: Vec<JobOfferCardView> = jobs.iter().map(build_job_card).collect();

    FixerProfileView {
        id: user.id,
        name: user.name,
        email: user.email,
        whatsapp_digits: whatsapp_digits(&user.phone),
        phone: user.phone,
        photo_url,
        city: DEFAULT_CITY.to_string(),
        rating: DEFAULT_RATING,
        bio,
        join_date_label: join_date_label(profile.created_at.as_deref()),
        services,
        payment_methods,
        completed_jobs,
        cancelled_jobs,
        total_jobs: jobs.len(),
        jobs: jobs_view,
        map,
    }
}

fn build_job_card(job: &JobOffer) -> JobOfferCardView {
    let (lat, lng) = match &job.location {
        Some(loc) => (loc.lat, loc.lng),
        None => (DEFAULT_JOB_LAT, DEFAULT_JOB_LNG),
    };

    let address_label = job
        .location
        .as_ref()
        .and_then(|loc| loc.address.as_deref())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_JOB_ADDRESS.to_string());

    JobOfferCardView {
        title: job.title.clone(),
        description: job.description.clone(),
        price_label: format_price_label(job.price),
        status: job.status.clone(),
        status_label: format_status_label(&job.status),
        tags: job.tags.clone(),
        date_label: job.created_at.as_deref().map(ymd_label).unwrap_or_default(),
        address_label,
        lat,
        lng,
        photo_url: job.photos.first().cloned().unwrap_or_default(),
    }
}

fn count_with_status(jobs: &[JobOffer], status: &str) -> usize {
    jobs.iter().filter(|job| job.status == status).count()
}

fn format_payment_label(code: &str) -> String {
    match code {
        "cash" => "Efectivo".to_string(),
        "transfer" => "Transferencia".to_string(),
        "qr" => "Código QR".to_string(),
        _ => capitalize(code),
    }
}

fn format_status_label(status: &str) -> String {
    match status {
        "open" => "Abierto".to_string(),
        "accepted" => "Aceptado".to_string(),
        "in_progress" => "En progreso".to_string(),
        STATUS_COMPLETED => "Completado".to_string(),
        STATUS_CANCELLED => "Cancelado".to_string(),
        other => capitalize(other),
    }
}

fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// WhatsApp links want the number without "+591" and without separators.
fn whatsapp_digits(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit())
        .skip(3)
        .collect()
}

fn join_date_label(created_at: Option<&str>) -> String {
    created_at
        .map(ymd_label)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_JOIN_DATE.to_string())
}

// Input is an ISO-ish string like: 2025-02-11T10:06:13.256414
// Keep it dependency-free (no chrono); the label is just the date part.
fn ymd_label(raw: &str) -> String {
    let date = raw.get(0..10).unwrap_or(raw);
    if parse_ymd(date).is_some() {
        date.to_string()
    } else {
        String::new()
    }
}

fn parse_ymd(date: &str) -> Option<(i32, i32, i32)> {
    let mut parts = date.split('-');
    let y: i32 = parts.next()?.parse().ok()?;
    let m: i32 = parts.next()?.parse().ok()?;
    let d: i32 = parts.next()?.parse().ok()?;
    Some((y, m, d))
}

fn format_price_label(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("Bs {:.0}", price)
    } else {
        format!("Bs {:.2}", price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AdditionalInfo, FixerProfileData, FixerUser, GeoPoint, JobLocation, PaymentMethodEntry,
        ServiceEntry,
    };

    fn sample_record(location: Option<GeoPoint>) -> FixerRecord {
        FixerRecord {
            user: FixerUser {
                id: "691646c477c99dee64b21689".to_string(),
                name: "Carlos Mamani".to_string(),
                email: "carlos@example.com".to_string(),
                phone: "+591 71234567".to_string(),
            },
            profile: FixerProfileData {
                photo_url: Some("/fotos/carlos.jpg".to_string()),
                services: vec![
                    ServiceEntry {
                        id: "svc-1".to_string(),
                        name: "Plomería".to_string(),
                    },
                    ServiceEntry {
                        id: "svc-2".to_string(),
                        name: "  ".to_string(),
                    },
                ],
                additional_info: Some(AdditionalInfo {
                    bio: Some("Plomero certificado.".to_string()),
                }),
                created_at: Some("2024-03-08T09:30:00.000Z".to_string()),
                payment_methods: vec![
                    PaymentMethodEntry {
                        kind: "cash".to_string(),
                    },
                    PaymentMethodEntry {
                        kind: "tarjeta".to_string(),
                    },
                ],
                location,
            },
        }
    }

    fn job(status: &str) -> JobOffer {
        JobOffer {
            id: format!("job-{}", status),
            title: "Reparar grifo".to_string(),
            description: "Fuga en la cocina".to_string(),
            price: 120.0,
            tags: vec!["plomería".to_string()],
            status: status.to_string(),
            location: None,
            fixer_id: "691646c477c99dee64b21689".to_string(),
            created_at: Some("2025-02-11T10:06:13.256414".to_string()),
            photos: vec![],
        }
    }

    #[test]
    fn test_counts_match_exact_status_only() {
        let jobs = vec![
            job("completed"),
            job("completed"),
            job("cancelled"),
            job("open"),
            job("Completed"),
        ];
        let view = build_view(sample_record(None), jobs);

        assert_eq!(view.completed_jobs, 2);
        assert_eq!(view.cancelled_jobs, 1);
        assert_eq!(view.total_jobs, 5);
        assert!(view.completed_jobs + view.cancelled_jobs <= view.total_jobs);
    }

    #[test]
    fn test_payment_labels_use_lookup_then_capitalize() {
        assert_eq!(format_payment_label("cash"), "Efectivo");
        assert_eq!(format_payment_label("transfer"), "Transferencia");
        assert_eq!(format_payment_label("qr"), "Código QR");
        assert_eq!(format_payment_label("card"), "Card");
        assert_eq!(format_payment_label("débito"), "Débito");
        assert_eq!(format_payment_label(""), "");
    }

    #[test]
    fn test_whatsapp_digits_drops_country_code() {
        assert_eq!(whatsapp_digits("+591 71234567"), "71234567");
        assert_eq!(whatsapp_digits("591-7123-4567"), "71234567");
        assert_eq!(whatsapp_digits("12"), "");
    }

    #[test]
    fn test_join_date_label_takes_date_part_or_default() {
        assert_eq!(join_date_label(Some("2024-03-08T09:30:00Z")), "2024-03-08");
        assert_eq!(join_date_label(Some("no es una fecha")), "2024-01-01");
        assert_eq!(join_date_label(None), "2024-01-01");
    }

    #[test]
    fn test_job_without_location_gets_defaults() {
        let card = build_job_card(&job("open"));
        assert_eq!(card.lat, DEFAULT_JOB_LAT);
        assert_eq!(card.lng, DEFAULT_JOB_LNG);
        assert_eq!(card.address_label, "Zona no especificada");
    }

    #[test]
    fn test_job_with_location_keeps_coords_and_address() {
        let mut offer = job("completed");
        offer.location = Some(JobLocation {
            lat: -17.39,
            lng: -66.15,
            address: Some("Av. América 123".to_string()),
        });
        let card = build_job_card(&offer);
        assert_eq!(card.lat, -17.39);
        assert_eq!(card.lng, -66.15);
        assert_eq!(card.address_label, "Av. América 123");
        assert_eq!(card.price_label, "Bs 120");
        assert_eq!(card.status_label, "Completado");
        assert_eq!(card.date_label, "2025-02-11");
    }

    #[test]
    fn test_price_label_keeps_cents_only_when_present() {
        assert_eq!(format_price_label(120.0), "Bs 120");
        assert_eq!(format_price_label(99.5), "Bs 99.50");
    }

    #[test]
    fn test_view_applies_profile_fallbacks() {
        let mut record = sample_record(None);
        record.profile.photo_url = None;
        record.profile.additional_info = None;
        record.profile.created_at = None;
        let view = build_view(record, vec![]);

        assert_eq!(view.photo_url, "/assets/img/placeholder-user.svg");
        assert_eq!(view.bio, "Técnico con experiencia en reparaciones del hogar.");
        assert_eq!(view.join_date_label, "2024-01-01");
        assert_eq!(view.city, "Cochabamba");
        assert_eq!(view.services, vec!["Plomería".to_string()]);
        assert_eq!(
            view.payment_methods,
            vec!["Efectivo".to_string(), "Tarjeta".to_string()]
        );
        assert!(view.map.is_none());
    }

    #[test]
    fn test_view_builds_map_only_with_usable_location() {
        let located = sample_record(Some(GeoPoint {
            lat: -17.4,
            lng: -66.2,
        }));
        let view = build_view(located, vec![]);
        let map = view.map.unwrap();
        assert_eq!(map.latitude, -17.4);
        assert_eq!(map.longitude, -66.2);
        assert_eq!(map.display_name, "Carlos Mamani");
        assert_eq!(map.photo_url.as_deref(), Some("/fotos/carlos.jpg"));

        let zeroed = sample_record(Some(GeoPoint { lat: 0.0, lng: 0.0 }));
        assert!(build_view(zeroed, vec![]).map.is_none());
    }
}
