// Shared in-memory collaborators for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use rakt_dispatch::core::{DonorMatcher, GeoResolver, RequestHandler};
use rakt_dispatch::models::{BloodRequest, DonorRecord, PushMessage};
use rakt_dispatch::ports::{
    DirectoryError, DonorDirectory, GeocodeError, GeocodeHit, Geocoder, PushError, PushService,
    RequestStore, StoreError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub struct FakeDirectory {
    donors: Result<Vec<DonorRecord>, String>,
}

impl FakeDirectory {
    pub fn with(donors: Vec<DonorRecord>) -> Arc<Self> {
        Arc::new(Self { donors: Ok(donors) })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            donors: Err(message.to_string()),
        })
    }
}

#[async_trait]
impl DonorDirectory for FakeDirectory {
    async fn active_donors(&self) -> Result<Vec<DonorRecord>, DirectoryError> {
        self.donors.clone().map_err(DirectoryError)
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub requests: Mutex<Vec<BloodRequest>>,
    pub fail: bool,
}

#[async_trait]
impl RequestStore for FakeStore {
    async fn append(&self, request: &BloodRequest) -> Result<String, StoreError> {
        if self.fail {
            return Err(StoreError("connection refused".to_string()));
        }
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        Ok(format!("req-{}", requests.len()))
    }
}

/// Records messages; tokens starting with "bad" fail to send
#[derive(Default)]
pub struct FakePush {
    pub sent: Mutex<Vec<PushMessage>>,
}

impl FakePush {
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens: Vec<_> = self.sent.lock().unwrap().iter().map(|m| m.token.clone()).collect();
        tokens.sort();
        tokens
    }
}

#[async_trait]
impl PushService for FakePush {
    async fn send(&self, message: &PushMessage) -> Result<String, PushError> {
        self.sent.lock().unwrap().push(message.clone());
        if message.token.starts_with("bad") {
            return Err(PushError("unregistered token".to_string()));
        }
        Ok(format!("projects/test/messages/{}", message.token))
    }
}

pub struct FakeGeocoder {
    hit: Option<(String, String)>,
    pub calls: AtomicUsize,
}

impl FakeGeocoder {
    pub fn resolving(lat: &str, lon: &str) -> Arc<Self> {
        Arc::new(Self {
            hit: Some((lat.to_string(), lon.to_string())),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self {
            hit: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Geocoder for FakeGeocoder {
    async fn lookup(&self, _address: &str) -> Result<Option<GeocodeHit>, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.hit.clone().map(|(lat, lon)| GeocodeHit { lat, lon }))
    }
}

pub struct Harness {
    pub handler: RequestHandler,
    pub store: Arc<FakeStore>,
    pub push: Arc<FakePush>,
    pub geocoder: Arc<FakeGeocoder>,
}

pub fn harness(directory: Arc<FakeDirectory>) -> Harness {
    harness_with(directory, Arc::new(FakeStore::default()), FakeGeocoder::empty())
}

pub fn harness_with(
    directory: Arc<FakeDirectory>,
    store: Arc<FakeStore>,
    geocoder: Arc<FakeGeocoder>,
) -> Harness {
    let push = Arc::new(FakePush::default());
    let handler = RequestHandler::new(
        GeoResolver::new(geocoder.clone()),
        directory,
        store.clone(),
        push.clone(),
        DonorMatcher::default(),
    );

    Harness {
        handler,
        store,
        push,
        geocoder,
    }
}

pub fn donor(id: &str, blood_type: &str, location: &str, token: &str) -> DonorRecord {
    DonorRecord {
        user_id: id.to_string(),
        fcm_token: Some(token.to_string()),
        blood_type: Some(blood_type.to_string()),
        location: Some(location.to_string()),
    }
}
