//! Device lifecycle: disposal side effects of status transitions.
//!
//! Every function here is pure. Stores call them with the persisted prior
//! record read under a row lock, inside the transaction that writes the result,
//! so a manual edit and an import row go through the same rules.

use chrono::{DateTime, NaiveDate, Utc};
use shared::text::non_blank;
use shared::validation::validate_date_window;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::{CreateDeviceRequest, Device, DisposedStatuses, RecordState, UpdateDeviceRequest};

/// Disposal fields as supplied by a caller. The outer `None` means "not supplied".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisposalInput {
    pub date: Option<Option<DateTime<Utc>>>,
    pub reason: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

/// Resolved values of one import row. `None` keeps the prior value on update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceDraft {
    pub tag: Option<String>,
    pub name: Option<String>,
    pub serial: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub ip_address: Option<String>,
    pub mac_address: Option<String>,
    pub type_id: Option<Uuid>,
    pub status_id: Option<Uuid>,
    pub os_id: Option<Uuid>,
    pub area_id: Option<Uuid>,
    pub assigned_user_id: Option<Uuid>,
    pub warranty_start: Option<NaiveDate>,
    pub warranty_end: Option<NaiveDate>,
    pub disposal_date: Option<DateTime<Utc>>,
    pub disposal_reason: Option<String>,
    pub disposal_notes: Option<String>,
    pub notes: Option<String>,
}

/// Applies the disposal rules to `next`, whose status has already been set.
///
/// `prior` is the persisted record before the change, `None` for a new device.
pub fn settle_disposal(
    prior: Option<&Device>,
    next: &mut Device,
    input: DisposalInput,
    disposed: &DisposedStatuses,
    now: DateTime<Utc>,
) {
    let was_disposed = prior.is_some_and(|p| disposed.contains(p.status_id));
    let is_disposed = disposed.contains(next.status_id);

    match (was_disposed, is_disposed) {
        (_, false) => {
            next.disposal_date = None;
            next.disposal_reason = None;
            next.disposal_notes = None;
        }
        (false, true) => {
            next.disposal_date = Some(input.date.flatten().unwrap_or(now));
            next.disposal_reason = input.reason.flatten().and_then(|r| non_blank(&r));
            next.disposal_notes = input.notes.flatten().and_then(|n| non_blank(&n));
        }
        (true, true) => {
            // Start from the stored values; only explicit input overrides them.
            if let Some(prior) = prior {
                next.disposal_date = prior.disposal_date;
                next.disposal_reason = prior.disposal_reason.clone();
                next.disposal_notes = prior.disposal_notes.clone();
            }
            if let Some(Some(date)) = input.date {
                next.disposal_date = Some(date);
            }
            if next.disposal_date.is_none() {
                next.disposal_date = Some(now);
            }
            if let Some(reason) = input.reason {
                next.disposal_reason = reason.and_then(|r| non_blank(&r));
            }
            if let Some(notes) = input.notes {
                next.disposal_notes = notes.and_then(|n| non_blank(&n));
            }
        }
    }
}

fn check_warranty(device: &Device) -> DomainResult<()> {
    validate_date_window(device.warranty_start, device.warranty_end).map_err(|e| {
        DomainError::validation(
            e.message
                .map(|m| m.to_string())
                .unwrap_or_else(|| "invalid warranty window".to_string()),
        )
    })
}

/// Builds a new device from a validated create request.
pub fn create_device(
    tenant_id: Uuid,
    request: CreateDeviceRequest,
    disposed: &DisposedStatuses,
    now: DateTime<Utc>,
) -> DomainResult<Device> {
    let name = non_blank(&request.name).ok_or_else(|| DomainError::validation("name is required"))?;

    let mut device = Device::blank(tenant_id, &name, now);
    device.tag = request.tag.and_then(|v| non_blank(&v));
    device.serial = request.serial.and_then(|v| non_blank(&v));
    device.brand = request.brand.and_then(|v| non_blank(&v));
    device.model = request.model.and_then(|v| non_blank(&v));
    device.ip_address = request.ip_address.and_then(|v| non_blank(&v));
    device.mac_address = request.mac_address.and_then(|v| non_blank(&v));
    device.type_id = request.type_id;
    device.status_id = request.status_id;
    device.os_id = request.os_id;
    device.area_id = request.area_id;
    device.assigned_user_id = request.assigned_user_id;
    device.warranty_start = request.warranty_start;
    device.warranty_end = request.warranty_end;
    device.notes = request.notes.and_then(|v| non_blank(&v));
    check_warranty(&device)?;

    let input = DisposalInput {
        date: Some(request.disposal_date),
        reason: Some(request.disposal_reason),
        notes: Some(request.disposal_notes),
    };
    settle_disposal(None, &mut device, input, disposed, now);
    Ok(device)
}

fn patch<T>(target: &mut Option<T>, change: &Option<Option<T>>)
where
    T: Clone,
{
    if let Some(value) = change {
        *target = value.clone();
    }
}

fn patch_text(target: &mut Option<String>, change: &Option<Option<String>>) {
    if let Some(value) = change {
        *target = value.as_deref().and_then(non_blank);
    }
}

/// Computes the record a manual edit produces from the persisted `prior`.
pub fn apply_update(
    prior: &Device,
    changes: &UpdateDeviceRequest,
    disposed: &DisposedStatuses,
    now: DateTime<Utc>,
) -> DomainResult<Device> {
    let mut next = prior.clone();

    if let Some(name) = &changes.name {
        next.name = non_blank(name).ok_or_else(|| DomainError::validation("name cannot be blank"))?;
    }
    patch_text(&mut next.tag, &changes.tag);
    patch_text(&mut next.serial, &changes.serial);
    patch_text(&mut next.brand, &changes.brand);
    patch_text(&mut next.model, &changes.model);
    patch_text(&mut next.ip_address, &changes.ip_address);
    patch_text(&mut next.mac_address, &changes.mac_address);
    patch(&mut next.type_id, &changes.type_id);
    patch(&mut next.status_id, &changes.status_id);
    patch(&mut next.os_id, &changes.os_id);
    patch(&mut next.area_id, &changes.area_id);
    patch(&mut next.assigned_user_id, &changes.assigned_user_id);
    patch(&mut next.warranty_start, &changes.warranty_start);
    patch(&mut next.warranty_end, &changes.warranty_end);
    patch_text(&mut next.notes, &changes.notes);
    check_warranty(&next)?;

    let input = DisposalInput {
        date: changes.disposal_date,
        reason: changes.disposal_reason.clone(),
        notes: changes.disposal_notes.clone(),
    };
    settle_disposal(Some(prior), &mut next, input, disposed, now);
    next.updated_at = now;
    Ok(next)
}

/// Computes the record an import row produces. A matched row is revived if it
/// was soft-deleted; blank cells keep the prior value.
pub fn apply_import(
    prior: Option<&Device>,
    draft: &DeviceDraft,
    tenant_id: Uuid,
    disposed: &DisposedStatuses,
    now: DateTime<Utc>,
) -> DomainResult<Device> {
    let mut next = match prior {
        Some(prior) => {
            let mut next = prior.clone();
            if let Some(name) = &draft.name {
                next.name = name.clone();
            }
            next.updated_at = now;
            next.state = RecordState::Active;
            next
        }
        None => {
            let name = draft
                .name
                .clone()
                .or_else(|| draft.serial.clone())
                .ok_or_else(|| DomainError::validation("name or serial is required"))?;
            Device::blank(tenant_id, &name, now)
        }
    };

    fn keep<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
        if value.is_some() {
            *target = value.clone();
        }
    }

    keep(&mut next.tag, &draft.tag);
    keep(&mut next.serial, &draft.serial);
    keep(&mut next.brand, &draft.brand);
    keep(&mut next.model, &draft.model);
    keep(&mut next.ip_address, &draft.ip_address);
    keep(&mut next.mac_address, &draft.mac_address);
    keep(&mut next.type_id, &draft.type_id);
    keep(&mut next.status_id, &draft.status_id);
    keep(&mut next.os_id, &draft.os_id);
    keep(&mut next.area_id, &draft.area_id);
    keep(&mut next.assigned_user_id, &draft.assigned_user_id);
    keep(&mut next.warranty_start, &draft.warranty_start);
    keep(&mut next.warranty_end, &draft.warranty_end);
    keep(&mut next.notes, &draft.notes);
    check_warranty(&next)?;

    let input = DisposalInput {
        date: draft.disposal_date.map(Some),
        reason: draft.disposal_reason.clone().map(Some),
        notes: draft.disposal_notes.clone().map(Some),
    };
    settle_disposal(prior, &mut next, input, disposed, now);
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogEntry, CatalogKind};
    use chrono::Duration;

    struct Fixture {
        active: Uuid,
        repair: Uuid,
        disposed_id: Uuid,
        disposed: DisposedStatuses,
    }

    fn fixture() -> Fixture {
        let now = Utc::now();
        let active = CatalogEntry::new(CatalogKind::DeviceStatus, "Activo", now);
        let repair = CatalogEntry::new(CatalogKind::DeviceStatus, "En reparación", now);
        let baja = CatalogEntry::new(CatalogKind::DeviceStatus, "Baja", now);
        Fixture {
            active: active.id,
            repair: repair.id,
            disposed_id: baja.id,
            disposed: DisposedStatuses::from_entries([&active, &repair, &baja]),
        }
    }

    fn device(status: Uuid) -> Device {
        let mut device = Device::blank(Uuid::new_v4(), "PC Recepción", Utc::now());
        device.serial = Some("SN-001".into());
        device.status_id = Some(status);
        device
    }

    fn to_status(status: Uuid) -> UpdateDeviceRequest {
        UpdateDeviceRequest {
            status_id: Some(Some(status)),
            ..Default::default()
        }
    }

    #[test]
    fn test_entering_disposed_stamps_now() {
        let f = fixture();
        let prior = device(f.active);
        let now = Utc::now();

        let mut changes = to_status(f.disposed_id);
        changes.disposal_reason = Some(Some("Pantalla rota".into()));
        let next = apply_update(&prior, &changes, &f.disposed, now).unwrap();

        assert_eq!(next.disposal_date, Some(now));
        assert_eq!(next.disposal_reason.as_deref(), Some("Pantalla rota"));
        assert_eq!(next.disposal_notes, None);
    }

    #[test]
    fn test_entering_disposed_keeps_explicit_date() {
        let f = fixture();
        let prior = device(f.active);
        let date = Utc::now() - Duration::days(10);

        let mut changes = to_status(f.disposed_id);
        changes.disposal_date = Some(Some(date));
        let next = apply_update(&prior, &changes, &f.disposed, Utc::now()).unwrap();

        assert_eq!(next.disposal_date, Some(date));
    }

    #[test]
    fn test_leaving_disposed_clears_fields_even_if_supplied() {
        let f = fixture();
        let mut prior = device(f.disposed_id);
        prior.disposal_date = Some(Utc::now());
        prior.disposal_reason = Some("Obsoleto".into());
        prior.disposal_notes = Some("Almacén".into());

        let mut changes = to_status(f.active);
        changes.disposal_date = Some(Some(Utc::now()));
        changes.disposal_reason = Some(Some("ignored".into()));
        changes.disposal_notes = Some(Some("ignored".into()));
        let next = apply_update(&prior, &changes, &f.disposed, Utc::now()).unwrap();

        assert_eq!(next.disposal_date, None);
        assert_eq!(next.disposal_reason, None);
        assert_eq!(next.disposal_notes, None);
    }

    #[test]
    fn test_staying_disposed_is_idempotent() {
        let f = fixture();
        let prior_date = Utc::now() - Duration::days(3);
        let mut prior = device(f.disposed_id);
        prior.disposal_date = Some(prior_date);
        prior.disposal_reason = Some("Obsoleto".into());

        let changes = to_status(f.disposed_id);
        let once = apply_update(&prior, &changes, &f.disposed, Utc::now()).unwrap();
        let twice = apply_update(&once, &changes, &f.disposed, Utc::now()).unwrap();

        assert_eq!(twice.disposal_date, Some(prior_date));
        assert_eq!(twice.disposal_reason.as_deref(), Some("Obsoleto"));
        assert_eq!(twice.disposal_notes, None);
    }

    #[test]
    fn test_non_disposed_transition_has_no_disposal_fields() {
        let f = fixture();
        let prior = device(f.active);

        let mut changes = to_status(f.repair);
        changes.disposal_reason = Some(Some("not disposed".into()));
        let next = apply_update(&prior, &changes, &f.disposed, Utc::now()).unwrap();

        assert_eq!(next.status_id, Some(f.repair));
        assert!(!next.has_disposal_fields());
    }

    #[test]
    fn test_end_to_end_dispose_then_reactivate() {
        let f = fixture();
        let d = device(f.active);

        let t1 = Utc::now();
        let mut dispose = to_status(f.disposed_id);
        dispose.disposal_reason = Some(Some("Fin de vida útil".into()));
        let disposed = apply_update(&d, &dispose, &f.disposed, t1).unwrap();
        assert_eq!(disposed.disposal_date, Some(t1));
        assert_eq!(disposed.disposal_reason.as_deref(), Some("Fin de vida útil"));

        let mut reactivate = to_status(f.active);
        reactivate.disposal_reason = Some(Some("should vanish".into()));
        reactivate.disposal_notes = Some(Some("should vanish".into()));
        let active = apply_update(&disposed, &reactivate, &f.disposed, Utc::now()).unwrap();
        assert!(!active.has_disposal_fields());
    }

    #[test]
    fn test_update_rejects_inverted_warranty() {
        let f = fixture();
        let mut prior = device(f.active);
        prior.warranty_start = NaiveDate::from_ymd_opt(2025, 6, 1);

        let changes = UpdateDeviceRequest {
            warranty_end: Some(NaiveDate::from_ymd_opt(2024, 1, 1)),
            ..Default::default()
        };
        assert!(matches!(
            apply_update(&prior, &changes, &f.disposed, Utc::now()),
            Err(DomainError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_create_with_disposed_status() {
        let f = fixture();
        let now = Utc::now();
        let request = CreateDeviceRequest {
            name: "Impresora".into(),
            status_id: Some(f.disposed_id),
            disposal_notes: Some("Sin tóner".into()),
            ..Default::default()
        };
        let device = create_device(Uuid::new_v4(), request, &f.disposed, now).unwrap();
        assert_eq!(device.disposal_date, Some(now));
        assert_eq!(device.disposal_notes.as_deref(), Some("Sin tóner"));

        let request = CreateDeviceRequest {
            name: "Impresora".into(),
            status_id: Some(f.active),
            disposal_reason: Some("dropped".into()),
            ..Default::default()
        };
        let device = create_device(Uuid::new_v4(), request, &f.disposed, now).unwrap();
        assert!(!device.has_disposal_fields());
    }

    #[test]
    fn test_import_revives_and_keeps_blank_cells() {
        let f = fixture();
        let mut prior = device(f.active);
        prior.brand = Some("HP".into());
        prior.state = RecordState::SoftDeleted { at: Utc::now() };

        let draft = DeviceDraft {
            serial: Some("SN-001".into()),
            model: Some("ProDesk 400".into()),
            ..Default::default()
        };
        let next = apply_import(Some(&prior), &draft, prior.tenant_id, &f.disposed, Utc::now())
            .unwrap();

        assert_eq!(next.id, prior.id);
        assert!(next.state.is_active());
        assert_eq!(next.brand.as_deref(), Some("HP"));
        assert_eq!(next.model.as_deref(), Some("ProDesk 400"));
        assert_eq!(next.name, "PC Recepción");
    }

    #[test]
    fn test_import_new_device_named_after_serial() {
        let f = fixture();
        let draft = DeviceDraft {
            serial: Some("XYZ-9".into()),
            status_id: Some(f.disposed_id),
            ..Default::default()
        };
        let now = Utc::now();
        let next = apply_import(None, &draft, Uuid::new_v4(), &f.disposed, now).unwrap();
        assert_eq!(next.name, "XYZ-9");
        assert_eq!(next.disposal_date, Some(now));
    }
}
