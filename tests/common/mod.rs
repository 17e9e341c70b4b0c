//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use cars_catalog::transport::http::{create_router, AppState};
use cars_catalog::{
    Car, CarId, CarInfoError, CarInfoResolver, CarStore, Owner, OwnerId, SearchRequest,
    StorageError, StoredCar,
};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Debug, Clone)]
pub struct CarRow {
    pub reg_num: String,
    pub mark: String,
    pub model: String,
    pub year: i32,
}

#[derive(Default)]
struct MemoryState {
    next_car_id: CarId,
    next_owner_id: OwnerId,
    cars: BTreeMap<CarId, CarRow>,
    owners: BTreeMap<OwnerId, Owner>,
    links: Vec<(CarId, OwnerId)>,
}

/// In-memory `CarStore` with the same observable behaviour as the Postgres one.
///
/// `fail_on` makes every call of the named operation fail with an internal
/// error; `fail_on_call` fails only its n-th call (1-based).
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    fail_on: Mutex<HashSet<&'static str>>,
    fail_on_call: Mutex<HashMap<&'static str, usize>>,
    pub calls: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_on(&self, op: &'static str) {
        self.fail_on.lock().unwrap().insert(op);
    }

    pub fn fail_on_call(&self, op: &'static str, nth: usize) {
        self.fail_on_call.lock().unwrap().insert(op, nth);
    }

    pub fn car(&self, car_id: CarId) -> Option<CarRow> {
        self.state.lock().unwrap().cars.get(&car_id).cloned()
    }

    pub fn owner(&self, owner_id: OwnerId) -> Option<Owner> {
        self.state.lock().unwrap().owners.get(&owner_id).cloned()
    }

    pub fn owner_count(&self) -> usize {
        self.state.lock().unwrap().owners.len()
    }

    pub fn owners_of(&self, car_id: CarId) -> Vec<OwnerId> {
        self.state
            .lock()
            .unwrap()
            .links
            .iter()
            .filter(|(c, _)| *c == car_id)
            .map(|(_, o)| *o)
            .collect()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn enter(&self, op: &'static str) -> Result<(), StorageError> {
        let nth = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(op.to_string());
            calls.iter().filter(|c| c.as_str() == op).count()
        };
        let fails_now = self.fail_on_call.lock().unwrap().get(op) == Some(&nth);
        if fails_now || self.fail_on.lock().unwrap().contains(op) {
            return Err(StorageError::Internal {
                op,
                source: sqlx::Error::Protocol("injected failure".to_string()),
            });
        }
        Ok(())
    }
}

fn find_or_create(state: &mut MemoryState, owner: &Owner) -> OwnerId {
    if let Some((id, _)) = state.owners.iter().find(|(_, o)| *o == owner) {
        return *id;
    }
    state.next_owner_id += 1;
    let id = state.next_owner_id;
    state.owners.insert(id, owner.clone());
    id
}

#[async_trait]
impl CarStore for MemoryStore {
    async fn ping(&self) -> Result<(), StorageError> {
        self.enter("ping")
    }

    async fn save_owner(&self, owner: &Owner) -> Result<OwnerId, StorageError> {
        self.enter("save_owner")?;
        let mut state = self.state.lock().unwrap();
        state.next_owner_id += 1;
        let id = state.next_owner_id;
        state.owners.insert(id, owner.clone());
        Ok(id)
    }

    async fn get_owner_id(&self, owner: &Owner) -> Result<OwnerId, StorageError> {
        self.enter("get_owner_id")?;
        Ok(find_or_create(&mut self.state.lock().unwrap(), owner))
    }

    async fn save_car(&self, car: &Car) -> Result<CarId, StorageError> {
        self.enter("save_car")?;
        let mut state = self.state.lock().unwrap();
        state.next_car_id += 1;
        let car_id = state.next_car_id;
        state.cars.insert(
            car_id,
            CarRow {
                reg_num: car.reg_num.clone(),
                mark: car.mark.clone(),
                model: car.model.clone(),
                year: car.year,
            },
        );
        let owner_id = find_or_create(&mut state, &car.owner);
        state.links.push((car_id, owner_id));
        Ok(car_id)
    }

    async fn search_cars(&self, request: &SearchRequest) -> Result<Vec<StoredCar>, StorageError> {
        self.enter("search_cars")?;
        let state = self.state.lock().unwrap();
        let q = request.query.as_str();
        let mut hits: Vec<StoredCar> = state
            .links
            .iter()
            .filter_map(|(car_id, owner_id)| {
                let row = state.cars.get(car_id)?;
                let owner = state.owners.get(owner_id)?;
                let matched = [
                    &row.reg_num,
                    &row.mark,
                    &row.model,
                    &owner.name,
                    &owner.surname,
                    &owner.patronymic,
                ]
                .iter()
                .any(|field| field.contains(q));
                matched.then(|| StoredCar {
                    car_id: *car_id,
                    owner_id: *owner_id,
                    car: Car {
                        reg_num: row.reg_num.clone(),
                        mark: row.mark.clone(),
                        model: row.model.clone(),
                        year: row.year,
                        owner: owner.clone(),
                    },
                })
            })
            .collect();
        hits.sort_by_key(|c| (c.car_id, c.owner_id));
        Ok(hits
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.page_size as usize)
            .collect())
    }

    async fn delete_car(&self, car_id: CarId) -> Result<(), StorageError> {
        const OP: &str = "delete_car";
        self.enter(OP)?;
        let mut state = self.state.lock().unwrap();
        state.links.retain(|(c, _)| *c != car_id);
        state
            .cars
            .remove(&car_id)
            .map(|_| ())
            .ok_or(StorageError::NotFound { op: OP })
    }

    async fn delete_owner(&self, owner_id: OwnerId) -> Result<(), StorageError> {
        const OP: &str = "delete_owner";
        self.enter(OP)?;
        let mut state = self.state.lock().unwrap();
        state.links.retain(|(_, o)| *o != owner_id);
        state
            .owners
            .remove(&owner_id)
            .map(|_| ())
            .ok_or(StorageError::NotFound { op: OP })
    }

    async fn update_reg_num(&self, car_id: CarId, reg_num: &str) -> Result<(), StorageError> {
        self.update_car_with("update_reg_num", car_id, |row| row.reg_num = reg_num.to_string())
    }

    async fn update_mark(&self, car_id: CarId, mark: &str) -> Result<(), StorageError> {
        self.update_car_with("update_mark", car_id, |row| row.mark = mark.to_string())
    }

    async fn update_model(&self, car_id: CarId, model: &str) -> Result<(), StorageError> {
        self.update_car_with("update_model", car_id, |row| row.model = model.to_string())
    }

    async fn update_year(&self, car_id: CarId, year: i32) -> Result<(), StorageError> {
        self.update_car_with("update_year", car_id, |row| row.year = year)
    }

    async fn update_owner(&self, car_id: CarId, owner: &Owner) -> Result<(), StorageError> {
        const OP: &str = "update_owner";
        self.enter(OP)?;
        let mut state = self.state.lock().unwrap();
        if !state.cars.contains_key(&car_id) {
            return Err(StorageError::NotFound { op: OP });
        }
        let owner_id = find_or_create(&mut state, owner);
        state.links.retain(|(c, _)| *c != car_id);
        state.links.push((car_id, owner_id));
        Ok(())
    }

    async fn update_owner_name(&self, owner_id: OwnerId, name: &str) -> Result<(), StorageError> {
        self.update_owner_with("update_owner_name", owner_id, |o| o.name = name.to_string())
    }

    async fn update_owner_surname(
        &self,
        owner_id: OwnerId,
        surname: &str,
    ) -> Result<(), StorageError> {
        self.update_owner_with("update_owner_surname", owner_id, |o| {
            o.surname = surname.to_string()
        })
    }

    async fn update_owner_patronymic(
        &self,
        owner_id: OwnerId,
        patronymic: &str,
    ) -> Result<(), StorageError> {
        self.update_owner_with("update_owner_patronymic", owner_id, |o| {
            o.patronymic = patronymic.to_string()
        })
    }
}

impl MemoryStore {
    fn update_car_with(
        &self,
        op: &'static str,
        car_id: CarId,
        apply: impl FnOnce(&mut CarRow),
    ) -> Result<(), StorageError> {
        self.enter(op)?;
        let mut state = self.state.lock().unwrap();
        let row = state
            .cars
            .get_mut(&car_id)
            .ok_or(StorageError::NotFound { op })?;
        apply(row);
        Ok(())
    }

    fn update_owner_with(
        &self,
        op: &'static str,
        owner_id: OwnerId,
        apply: impl FnOnce(&mut Owner),
    ) -> Result<(), StorageError> {
        self.enter(op)?;
        let mut state = self.state.lock().unwrap();
        let owner = state
            .owners
            .get_mut(&owner_id)
            .ok_or(StorageError::NotFound { op })?;
        apply(owner);
        Ok(())
    }
}

/// What the scripted car-info service answers.
pub enum Script {
    Cars(Vec<Car>),
    Fail(fn() -> CarInfoError),
}

/// `CarInfoResolver` that answers from a fixed script and records the requests.
pub struct ScriptedResolver {
    script: Script,
    pub requests: Mutex<Vec<Vec<String>>>,
}

impl ScriptedResolver {
    pub fn returning(cars: Vec<Car>) -> Arc<Self> {
        Arc::new(Self {
            script: Script::Cars(cars),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(err: fn() -> CarInfoError) -> Arc<Self> {
        Arc::new(Self {
            script: Script::Fail(err),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<Vec<String>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CarInfoResolver for ScriptedResolver {
    async fn resolve(&self, reg_nums: &[String]) -> Result<Vec<Car>, CarInfoError> {
        self.requests.lock().unwrap().push(reg_nums.to_vec());
        match &self.script {
            Script::Cars(cars) => Ok(cars.clone()),
            Script::Fail(make) => Err(make()),
        }
    }
}

pub fn sample_car(reg_num: &str, owner: Owner) -> Car {
    Car {
        reg_num: reg_num.to_string(),
        mark: "Lada".to_string(),
        model: "Vesta".to_string(),
        year: 2002,
        owner,
    }
}

pub fn ivan_petrov() -> Owner {
    Owner::new("Ivan", "Petrov", "Sergeevich")
}

pub fn app(store: Arc<MemoryStore>, resolver: Arc<ScriptedResolver>) -> Router {
    create_router(AppState {
        storage: store,
        car_info: resolver,
    })
}

/// Sends a JSON request through the router and returns the status and parsed body.
pub async fn send(app: Router, method: Method, uri: &str, body: JsonValue) -> (StatusCode, JsonValue) {
    send_raw(app, method, uri, body.to_string()).await
}

pub async fn send_raw(app: Router, method: Method, uri: &str, body: String) -> (StatusCode, JsonValue) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null);
    (status, json)
}
