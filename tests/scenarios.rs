//! End-to-end support desk workflows over the in-memory repository

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use itdesk::clock::{Clock, FixedClock};
use itdesk::config::AuthConfig;
use itdesk::error::{AppError, EntityKind};
use itdesk::models::breakdown::{Breakdown, BreakdownPriority, BreakdownType, CreateBreakdown};
use itdesk::models::equipment::{CreateEquipment, Equipment, EquipmentStatus};
use itdesk::models::ticket::{ReportBreakdown, Ticket, TicketStatus};
use itdesk::models::user::{LoginRequest, RegisterRequest, Role, Session};
use itdesk::repository::Repository;
use itdesk::services::policy::{Access, DenyReason, ResourceTree};
use itdesk::services::session::SessionStore;
use itdesk::services::Services;

struct Desk {
    services: Services,
    clock: Arc<FixedClock>,
    admin: Session,
    client: Session,
    technician: Session,
}

fn registration(username: &str) -> RegisterRequest {
    RegisterRequest {
        full_name: format!("{} Doe", username),
        mail: format!("{}@example.org", username),
        username: username.to_string(),
        password: "hunter22".to_string(),
        phone: None,
        address: None,
        avatar_url: None,
    }
}

async fn desk() -> Desk {
    // later fixtures hit the already-installed subscriber, hence try_init
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();

    let clock = Arc::new(FixedClock::at(Utc.timestamp_opt(1_700_000_000, 0).unwrap()));
    let config = AuthConfig {
        jwt_secret: "integration-secret".to_string(),
        jwt_expiration_hours: 24,
    };
    let services = Services::new(Repository::in_memory(), &config, clock.clone());

    let admin = session_for(&services, "astrid", Role::Admin).await;
    let client = session_for(&services, "carl", Role::Client).await;
    let technician = session_for(&services, "tessa", Role::Technician).await;

    Desk {
        services,
        clock,
        admin,
        client,
        technician,
    }
}

async fn session_for(services: &Services, username: &str, role: Role) -> Session {
    let request = registration(username);
    let (token, _) = match role {
        Role::Admin => services.auth.register_admin(request).await.unwrap(),
        Role::Client => services.auth.register_client(request).await.unwrap(),
        Role::Technician => services.auth.register_technician(request).await.unwrap(),
    };
    services.auth.verifier().verify(&token, Some(username)).unwrap()
}

/// Admin provisions a unit and a catalog entry and hands the unit to the
/// desk's client; returns the unit in service and the catalog entry.
async fn provision(desk: &Desk) -> (Equipment, Breakdown) {
    let unit = desk
        .services
        .equipment
        .create(
            &desk.admin,
            CreateEquipment {
                name: "workstation".to_string(),
                serial_number: "WS-001".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(unit.status, EquipmentStatus::Available);

    let unit = desk
        .services
        .equipment
        .assign_to_client(&desk.admin, unit.id, desk.client.user_id)
        .await
        .unwrap();
    assert_eq!(unit.status, EquipmentStatus::InService);
    assert_eq!(unit.client_id, Some(desk.client.user_id));

    let breakdown = desk
        .services
        .breakdowns
        .create(
            &desk.admin,
            CreateBreakdown {
                name: "no display".to_string(),
                description: "screen stays black at boot".to_string(),
                priority: BreakdownPriority::High,
                kind: BreakdownType::Hardware,
            },
        )
        .await
        .unwrap();

    (unit, breakdown)
}

async fn reported(desk: &Desk) -> Ticket {
    let (unit, breakdown) = provision(desk).await;
    desk.services
        .tickets
        .report_breakdown(
            &desk.client,
            ReportBreakdown {
                equipment_id: unit.id,
                breakdown_id: breakdown.id,
                description: "screen black since this morning".to_string(),
            },
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn client_report_opens_pending_ticket_and_breaks_down_equipment() {
    let desk = desk().await;
    let ticket = reported(&desk).await;

    assert_eq!(ticket.status, TicketStatus::Pending);
    assert_eq!(ticket.client_id, desk.client.user_id);
    assert_eq!(ticket.technician_id, None);
    assert_eq!(ticket.resolution_date, None);
    assert_eq!(ticket.reporting_date, desk.clock.now());

    let unit = desk
        .services
        .equipment
        .get(ticket.report.equipment_id)
        .await
        .unwrap();
    assert_eq!(unit.status, EquipmentStatus::BrokenDown);

    // the broken-down unit drops out of the client's reportable listing
    let reportable = desk
        .services
        .equipment
        .reportable_for_client(desk.client.user_id)
        .await
        .unwrap();
    assert!(reportable.is_empty());
}

#[tokio::test]
async fn second_report_on_open_link_is_rejected() {
    let desk = desk().await;
    let ticket = reported(&desk).await;

    let result = desk
        .services
        .tickets
        .report_breakdown(
            &desk.client,
            ReportBreakdown {
                equipment_id: ticket.report.equipment_id,
                breakdown_id: ticket.report.breakdown_id,
                description: "still black".to_string(),
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::IllegalAssignment(_))));

    // exactly one ticket exists
    assert_eq!(desk.services.tickets.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn report_on_unowned_equipment_is_rejected() {
    let desk = desk().await;
    let (_, breakdown) = provision(&desk).await;

    // a unit that was never assigned to this client
    let stray = desk
        .services
        .equipment
        .create(
            &desk.admin,
            CreateEquipment {
                name: "printer".to_string(),
                serial_number: "PR-007".to_string(),
            },
        )
        .await
        .unwrap();

    let result = desk
        .services
        .tickets
        .report_breakdown(
            &desk.client,
            ReportBreakdown {
                equipment_id: stray.id,
                breakdown_id: breakdown.id,
                description: "paper jam".to_string(),
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::IllegalAssignment(_))));
    assert!(desk.services.tickets.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn assignment_sets_technician_but_not_status_or_availability() {
    let desk = desk().await;
    let ticket = reported(&desk).await;

    let ticket = desk
        .services
        .tickets
        .assign_to_technician(&desk.admin, ticket.id, desk.technician.user_id)
        .await
        .unwrap();
    assert_eq!(ticket.technician_id, Some(desk.technician.user_id));
    assert_eq!(ticket.status, TicketStatus::Pending);

    // the technician keeps the availability flag and can accumulate work
    let available = desk.services.users.available_technicians().await.unwrap();
    assert!(available.iter().any(|t| t.id == desk.technician.user_id));

    // a second assignment on the same ticket is refused
    let again = desk
        .services
        .tickets
        .assign_to_technician(&desk.admin, ticket.id, desk.technician.user_id)
        .await;
    assert!(matches!(again, Err(AppError::IllegalAssignment(_))));
}

#[tokio::test]
async fn assignment_is_admin_only_and_needs_an_available_technician() {
    let desk = desk().await;
    let ticket = reported(&desk).await;

    let by_client = desk
        .services
        .tickets
        .assign_to_technician(&desk.client, ticket.id, desk.technician.user_id)
        .await;
    assert!(matches!(by_client, Err(AppError::Forbidden(_))));

    desk.services
        .users
        .set_availability(&desk.admin, desk.technician.user_id, false)
        .await
        .unwrap();
    let unavailable = desk
        .services
        .tickets
        .assign_to_technician(&desk.admin, ticket.id, desk.technician.user_id)
        .await;
    assert!(matches!(unavailable, Err(AppError::IllegalAssignment(_))));

    // a client id in the technician slot reads as technician-not-found
    let wrong_role = desk
        .services
        .tickets
        .assign_to_technician(&desk.admin, ticket.id, desk.client.user_id)
        .await;
    assert!(matches!(
        wrong_role,
        Err(AppError::NotFound {
            kind: EntityKind::Technician,
            ..
        })
    ));
}

#[tokio::test]
async fn repair_runs_to_repaired_and_frees_the_equipment() {
    let desk = desk().await;
    let ticket = reported(&desk).await;
    let ticket = desk
        .services
        .tickets
        .assign_to_technician(&desk.admin, ticket.id, desk.technician.user_id)
        .await
        .unwrap();

    desk.clock.advance(Duration::minutes(5));
    let ticket = desk
        .services
        .tickets
        .begin_repair(&desk.technician, ticket.id)
        .await
        .unwrap();
    assert_eq!(ticket.status, TicketStatus::Repairing);
    assert_eq!(ticket.resolution_date, None);
    assert_eq!(ticket.last_updated, desk.clock.now());

    let under_repair = desk
        .services
        .tickets
        .repairing_for(desk.technician.user_id)
        .await
        .unwrap();
    assert_eq!(under_repair.len(), 1);

    desk.clock.advance(Duration::hours(1));
    let ticket = desk
        .services
        .tickets
        .mark_repaired(&desk.technician, ticket.id)
        .await
        .unwrap();
    assert_eq!(ticket.status, TicketStatus::Repaired);
    assert_eq!(ticket.resolution_date, Some(desk.clock.now()));

    let unit = desk
        .services
        .equipment
        .get(ticket.report.equipment_id)
        .await
        .unwrap();
    assert_eq!(unit.status, EquipmentStatus::Available);

    // terminal tickets do not move again
    let again = desk
        .services
        .tickets
        .mark_failed(&desk.technician, ticket.id)
        .await;
    assert!(matches!(again, Err(AppError::InvalidTransition { .. })));
}

#[tokio::test]
async fn failed_repair_leaves_the_equipment_broken_down() {
    let desk = desk().await;
    let ticket = reported(&desk).await;
    let ticket = desk
        .services
        .tickets
        .assign_to_technician(&desk.admin, ticket.id, desk.technician.user_id)
        .await
        .unwrap();
    let ticket = desk
        .services
        .tickets
        .begin_repair(&desk.technician, ticket.id)
        .await
        .unwrap();

    let ticket = desk
        .services
        .tickets
        .mark_failed(&desk.technician, ticket.id)
        .await
        .unwrap();
    assert_eq!(ticket.status, TicketStatus::Failed);
    assert!(ticket.resolution_date.is_some());

    let unit = desk
        .services
        .equipment
        .get(ticket.report.equipment_id)
        .await
        .unwrap();
    assert_eq!(unit.status, EquipmentStatus::BrokenDown);
}

#[tokio::test]
async fn only_the_assigned_technician_can_move_the_ticket() {
    let desk = desk().await;
    let ticket = reported(&desk).await;
    let ticket = desk
        .services
        .tickets
        .assign_to_technician(&desk.admin, ticket.id, desk.technician.user_id)
        .await
        .unwrap();
    let ticket = desk
        .services
        .tickets
        .begin_repair(&desk.technician, ticket.id)
        .await
        .unwrap();

    let rival = session_for(&desk.services, "theo", Role::Technician).await;
    let result = desk.services.tickets.mark_repaired(&rival, ticket.id).await;
    assert!(matches!(result, Err(AppError::InvalidTransition { .. })));

    // nothing moved
    let unchanged = desk.services.tickets.get(ticket.id).await.unwrap();
    assert_eq!(unchanged.status, TicketStatus::Repairing);
    assert_eq!(unchanged.technician_id, Some(desk.technician.user_id));
    let unit = desk
        .services
        .equipment
        .get(ticket.report.equipment_id)
        .await
        .unwrap();
    assert_eq!(unit.status, EquipmentStatus::BrokenDown);
}

#[tokio::test]
async fn login_round_trip_and_lazy_session_expiry() {
    let desk = desk().await;

    let wrong = desk
        .services
        .auth
        .login(&LoginRequest {
            username: "carl".to_string(),
            password: "wrong".to_string(),
        })
        .await;
    assert!(matches!(wrong, Err(AppError::Unauthenticated)));

    let (token, session) = desk
        .services
        .auth
        .login(&LoginRequest {
            username: "carl".to_string(),
            password: "hunter22".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(session.role, Role::Client);

    let mut store = SessionStore::new();
    store.set(token, session);
    assert!(store.is_authenticated(desk.services.auth.verifier()));

    desk.clock.advance(Duration::hours(25));
    assert!(!store.is_authenticated(desk.services.auth.verifier()));
    assert!(store.current().is_none());
}

#[tokio::test]
async fn duplicate_username_registration_conflicts() {
    let desk = desk().await;
    let result = desk.services.auth.register_client(registration("carl")).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn policy_tree_guards_the_dashboards_per_session() {
    let desk = desk().await;
    let tree = ResourceTree::new()
        .declare("home", [Role::Admin, Role::Client, Role::Technician])
        .declare("admin", [Role::Admin])
        .declare("client", [Role::Client])
        .declare("technician", [Role::Technician]);

    let store = SessionStore::new();
    match tree.authorize(store.current(), "/admin/users") {
        Access::Denied(DenyReason::Unauthenticated { return_to }) => {
            assert_eq!(return_to, "/admin/users")
        }
        other => panic!("expected unauthenticated denial, got {:?}", other),
    }

    assert_eq!(tree.authorize(Some(&desk.admin), "/admin/users"), Access::Granted);
    assert_eq!(
        tree.authorize(Some(&desk.client), "/admin/users"),
        Access::Denied(DenyReason::Forbidden)
    );
    assert_eq!(tree.authorize(Some(&desk.client), "/client"), Access::Granted);
    assert_eq!(tree.authorize(Some(&desk.technician), "/technician"), Access::Granted);
}
