//! In-memory collaborators shared by the console integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use stationdesk_core::payment::{Payment, PaymentQuery, PaymentSummary};
use stationdesk_core::remote::{
    AssignStaffRequest, PageRequest, Pagination, PaymentLedger, PaymentPage, RemoteError,
    StaffDirectory, StaffPage, StaffPageQuery, UnassignStaffRequest, UserPage,
};
use stationdesk_core::staff::StaffMember;
use stationdesk_core::station::Station;

pub fn staff(id: &str, name: &str, station_id: Option<&str>) -> StaffMember {
    StaffMember {
        id: id.to_string(),
        full_name: name.to_string(),
        email: Some(format!("{}@example.com", id.to_lowercase())),
        phone: None,
        station_id: station_id.map(str::to_string),
    }
}

pub fn station(id: &str, code: &str, name: &str) -> Station {
    Station {
        id: id.to_string(),
        code: code.to_string(),
        name: name.to_string(),
        address: None,
    }
}

pub fn api_error(message: &str) -> RemoteError {
    RemoteError::Api {
        status: 400,
        message: Some(message.to_string()),
    }
}

// ---------------------------------------------------------------------------
// FakeDirectory
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeDirectory {
    pub stations: Mutex<Vec<Station>>,
    pub rosters: Mutex<HashMap<String, Vec<StaffMember>>>,
    pub unassigned: Mutex<Vec<StaffMember>>,
    pub users: Mutex<Vec<StaffMember>>,
    pub fail_unassign: Mutex<HashSet<String>>,
    pub fail_assign: Mutex<HashSet<String>>,
    pub fail_stations: Mutex<bool>,
    pub fail_rosters: Mutex<bool>,
    pub fail_users: Mutex<bool>,
    /// Mutation log: `unassign:<id>` and `assign:<id>-><station>`.
    pub calls: Mutex<Vec<String>>,
    pub last_unassigned_query: Mutex<Option<StaffPageQuery>>,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roster(self, station_id: &str, roster: Vec<StaffMember>) -> Self {
        self.rosters
            .lock()
            .unwrap()
            .insert(station_id.to_string(), roster);
        self
    }

    pub fn with_stations(self, stations: Vec<Station>) -> Self {
        *self.stations.lock().unwrap() = stations;
        self
    }

    pub fn failing_unassign(self, staff_id: &str) -> Self {
        self.fail_unassign.lock().unwrap().insert(staff_id.to_string());
        self
    }

    pub fn failing_assign(self, staff_id: &str) -> Self {
        self.fail_assign.lock().unwrap().insert(staff_id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StaffDirectory for FakeDirectory {
    async fn get_stations(&self) -> Result<Vec<Station>, RemoteError> {
        if *self.fail_stations.lock().unwrap() {
            return Err(RemoteError::Transport("connection refused".into()));
        }
        Ok(self.stations.lock().unwrap().clone())
    }

    async fn get_unassigned_staff(&self, query: &StaffPageQuery) -> Result<StaffPage, RemoteError> {
        *self.last_unassigned_query.lock().unwrap() = Some(query.clone());
        let needle = query.search.clone().unwrap_or_default().to_lowercase();
        let staff: Vec<StaffMember> = self
            .unassigned
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.full_name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        let pagination = Pagination::from_len(staff.len());
        Ok(StaffPage { staff, pagination })
    }

    async fn assign_staff(&self, request: &AssignStaffRequest) -> Result<(), RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("assign:{}->{}", request.user_id, request.station_id));
        if self.fail_assign.lock().unwrap().contains(&request.user_id) {
            return Err(api_error("Station is full"));
        }
        Ok(())
    }

    async fn unassign_staff(&self, request: &UnassignStaffRequest) -> Result<(), RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("unassign:{}", request.user_id));
        if self.fail_unassign.lock().unwrap().contains(&request.user_id) {
            return Err(api_error("Staff not found"));
        }
        Ok(())
    }

    async fn get_station_staff(&self, station_id: &str) -> Result<Vec<StaffMember>, RemoteError> {
        if *self.fail_rosters.lock().unwrap() {
            return Err(RemoteError::Api {
                status: 500,
                message: None,
            });
        }
        Ok(self
            .rosters
            .lock()
            .unwrap()
            .get(station_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_users_by_role(&self, _role: &str, _page: PageRequest) -> Result<UserPage, RemoteError> {
        if *self.fail_users.lock().unwrap() {
            return Err(RemoteError::Transport("connection reset".into()));
        }
        let users = self.users.lock().unwrap().clone();
        let pagination = Pagination::from_len(users.len());
        Ok(UserPage { users, pagination })
    }
}

// ---------------------------------------------------------------------------
// FakeLedger
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeLedger {
    pub payments: Vec<Payment>,
    pub summary: Option<PaymentSummary>,
    pub queries: Mutex<Vec<PaymentQuery>>,
    pub fail: Mutex<bool>,
}

impl FakeLedger {
    fn check(&self) -> Result<(), RemoteError> {
        if *self.fail.lock().unwrap() {
            return Err(RemoteError::Api {
                status: 503,
                message: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentLedger for FakeLedger {
    async fn get_payments(&self, query: &PaymentQuery) -> Result<PaymentPage, RemoteError> {
        self.queries.lock().unwrap().push(query.clone());
        self.check()?;
        Ok(PaymentPage {
            data: self.payments.clone(),
            summary: self.summary.clone(),
            pagination: Pagination::from_len(self.payments.len()),
        })
    }

    async fn export_payments(&self, query: &PaymentQuery) -> Result<Vec<u8>, RemoteError> {
        self.queries.lock().unwrap().push(query.clone());
        self.check()?;
        Ok(b"PK\x03\x04".to_vec())
    }
}
