//! Equipment management and client assignment rules

use validator::Validate;

use crate::{
    error::{AppResult, EntityKind},
    models::{
        equipment::{CreateEquipment, Equipment, EquipmentStatus, UpdateEquipment},
        user::{Role, Session},
    },
    repository::Repository,
    services::{require_admin, require_user_in_role},
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new unit (admin); starts Available with no owner
    pub async fn create(&self, actor: &Session, request: CreateEquipment) -> AppResult<Equipment> {
        require_admin(actor)?;
        request.validate()?;
        let equipment = Equipment {
            id: 0,
            name: request.name,
            status: EquipmentStatus::Available,
            serial_number: request.serial_number,
            client_id: None,
        };
        self.repository.equipment.insert(equipment).await
    }

    pub async fn get(&self, id: i64) -> AppResult<Equipment> {
        self.repository.equipment.get(id).await
    }

    pub async fn list(&self) -> AppResult<Vec<Equipment>> {
        self.repository.equipment.list().await
    }

    pub async fn update(
        &self,
        actor: &Session,
        id: i64,
        changes: UpdateEquipment,
    ) -> AppResult<Equipment> {
        require_admin(actor)?;
        let mut equipment = self.repository.equipment.get(id).await?;
        if let Some(name) = changes.name {
            equipment.name = name;
        }
        if let Some(serial_number) = changes.serial_number {
            equipment.serial_number = serial_number;
        }
        if let Some(status) = changes.status {
            equipment.status = status;
        }
        self.repository.equipment.save(&equipment).await?;
        Ok(equipment)
    }

    pub async fn delete(&self, actor: &Session, id: i64) -> AppResult<()> {
        require_admin(actor)?;
        self.repository.equipment.get(id).await?;
        self.repository.equipment.delete(id).await
    }

    /// Hand a unit to a client (admin). Replacing an existing owner is legal
    /// precisely because the operation is admin-only. The unit goes into
    /// service for its new owner.
    pub async fn assign_to_client(
        &self,
        actor: &Session,
        equipment_id: i64,
        client_id: i64,
    ) -> AppResult<Equipment> {
        require_admin(actor)?;
        let mut equipment = self.repository.equipment.get(equipment_id).await?;
        let client =
            require_user_in_role(&self.repository, client_id, Role::Client, EntityKind::Client)
                .await?;
        equipment.client_id = Some(client.id);
        equipment.status = EquipmentStatus::InService;
        self.repository.equipment.save(&equipment).await?;
        tracing::info!(equipment = equipment.id, client = client.id, "equipment assigned");
        Ok(equipment)
    }

    pub async fn list_by_client(&self, client_id: i64) -> AppResult<Vec<Equipment>> {
        self.repository.equipment.list_by_client(client_id).await
    }

    pub async fn list_out_of_service(&self) -> AppResult<Vec<Equipment>> {
        self.repository
            .equipment
            .list_by_status(EquipmentStatus::OutOfService)
            .await
    }

    /// The client's units that show up in "report a breakdown" listings.
    /// A read-side filter only; it does not lock the filtered-out units.
    pub async fn reportable_for_client(&self, client_id: i64) -> AppResult<Vec<Equipment>> {
        let units = self.repository.equipment.list_by_client(client_id).await?;
        Ok(units
            .into_iter()
            .filter(|e| e.status.is_reportable())
            .collect())
    }
}
