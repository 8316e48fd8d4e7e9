//! Shared harness: a scripted recognition provider and an engine wired to a
//! temp-dir image store.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use facia_core::geometry::BoundingBox;
use facia_core::retry::RetryPolicy;
use facia_db::models::face::NewDetectedFace;
use facia_db::models::{DetectedFace, Person, Photo};
use facia_db::repositories::{EncodingRepo, PersonRepo, PhotoRepo};
use facia_db::DbPool;
use facia_engine::{Engine, EngineConfig, ImageStore, LocalImageStore};
use facia_recognition::{
    IndexedTemplate, ProviderError, RecognitionProvider, RemoteFace, TemplateMatch,
};

type Scripted<T> = Mutex<VecDeque<Result<T, ProviderError>>>;

/// Test double for the external service. Detect/search/index pop scripted
/// responses in order; deletion and listing run against an in-memory
/// collection that successful `index_face` calls append to.
#[derive(Default)]
pub struct ScriptedProvider {
    detect_results: Scripted<Vec<RemoteFace>>,
    search_results: Scripted<Vec<TemplateMatch>>,
    index_results: Scripted<IndexedTemplate>,
    pub collection: Mutex<Vec<String>>,
    pub fail_deletes: AtomicBool,
    pub detect_calls: AtomicU32,
    pub search_calls: AtomicU32,
    pub index_calls: AtomicU32,
    pub delete_calls: AtomicU32,
    pub indexed_external_ids: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn push_detect(&self, result: Result<Vec<RemoteFace>, ProviderError>) {
        self.detect_results.lock().unwrap().push_back(result);
    }

    pub fn push_search(&self, result: Result<Vec<TemplateMatch>, ProviderError>) {
        self.search_results.lock().unwrap().push_back(result);
    }

    pub fn push_index(&self, result: Result<IndexedTemplate, ProviderError>) {
        self.index_results.lock().unwrap().push_back(result);
    }

    pub fn seed_collection(&self, template_ids: &[&str]) {
        self.collection
            .lock()
            .unwrap()
            .extend(template_ids.iter().map(|s| s.to_string()));
    }

    pub fn collection_snapshot(&self) -> Vec<String> {
        self.collection.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecognitionProvider for ScriptedProvider {
    async fn detect(&self, _image: &[u8]) -> Result<Vec<RemoteFace>, ProviderError> {
        self.detect_calls.fetch_add(1, Ordering::SeqCst);
        self.detect_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted detect call")
    }

    async fn search(
        &self,
        _image: &[u8],
        _min_similarity: f64,
        _max_results: u32,
    ) -> Result<Vec<TemplateMatch>, ProviderError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.search_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted search call")
    }

    async fn index_face(
        &self,
        _image: &[u8],
        external_id: &str,
    ) -> Result<IndexedTemplate, ProviderError> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        self.indexed_external_ids
            .lock()
            .unwrap()
            .push(external_id.to_string());
        let result = self
            .index_results
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted index call");
        if let Ok(indexed) = &result {
            self.collection
                .lock()
                .unwrap()
                .push(indexed.template_id.clone());
        }
        result
    }

    async fn delete_templates(
        &self,
        template_ids: &[String],
    ) -> Result<Vec<String>, ProviderError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(ProviderError::Transport("connection reset".into()));
        }
        let mut collection = self.collection.lock().unwrap();
        let mut deleted = Vec::new();
        for id in template_ids {
            if let Some(pos) = collection.iter().position(|c| c == id) {
                collection.remove(pos);
                deleted.push(id.clone());
            }
        }
        Ok(deleted)
    }

    async fn list_templates(&self) -> Result<Vec<String>, ProviderError> {
        Ok(self.collection.lock().unwrap().clone())
    }
}

pub struct TestHarness {
    pub engine: Engine,
    pub provider: Arc<ScriptedProvider>,
    pub store: Arc<LocalImageStore>,
    _store_dir: TempDir,
}

/// Engine over a fresh temp store with a fast retry schedule (same attempt
/// budget as production, millisecond delays).
pub fn harness(pool: DbPool) -> TestHarness {
    let provider = Arc::new(ScriptedProvider::default());
    let store_dir = tempfile::tempdir().unwrap();
    let store = Arc::new(LocalImageStore::new(store_dir.path()));
    let config = EngineConfig {
        retry: RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            multiplier: 1.0,
            max_jitter: Duration::ZERO,
        },
        ..Default::default()
    };
    let engine = Engine::new(pool, provider.clone(), store.clone(), config);
    TestHarness {
        engine,
        provider,
        store,
        _store_dir: store_dir,
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 180, 160]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Store a decodable image and register it as a pending photo.
pub async fn stored_photo(h: &TestHarness, pool: &DbPool) -> Photo {
    let key = h.store.save(&png_bytes(200, 200)).await.unwrap();
    PhotoRepo::create(pool, &key).await.unwrap()
}

/// A photo in `completed` state with one unassigned face row per box.
pub async fn completed_photo_with_faces(
    h: &TestHarness,
    pool: &DbPool,
    boxes: &[BoundingBox],
) -> (Photo, Vec<DetectedFace>) {
    let photo = stored_photo(h, pool).await;
    let faces: Vec<NewDetectedFace> = boxes
        .iter()
        .map(|b| NewDetectedFace {
            bounding_box: *b,
            quality_score: 80.0,
        })
        .collect();
    let inserted = PhotoRepo::store_detection_results(pool, photo.id, &faces, 1)
        .await
        .unwrap();
    let photo = PhotoRepo::find_by_id(pool, photo.id).await.unwrap().unwrap();
    (photo, inserted)
}

/// A person with one known template in the local shadow store.
pub async fn person_with_template(pool: &DbPool, name: &str, template_id: &str) -> Person {
    let person = PersonRepo::create(pool, name).await.unwrap();
    let mut conn = pool.acquire().await.unwrap();
    EncodingRepo::insert_in(&mut *conn, person.id, template_id, Some(90.0), None)
        .await
        .unwrap();
    person
}

pub fn remote_face(left: f64, top: f64, width: f64, height: f64, confidence: f64) -> RemoteFace {
    RemoteFace {
        bounding_box: BoundingBox::new(left, top, width, height),
        confidence,
        quality: None,
    }
}

pub fn template_match(
    template_id: &str,
    similarity: f64,
    region: Option<BoundingBox>,
) -> TemplateMatch {
    TemplateMatch {
        template_id: template_id.to_string(),
        similarity,
        region,
    }
}

pub fn indexed(template_id: &str) -> IndexedTemplate {
    IndexedTemplate {
        template_id: template_id.to_string(),
        bounding_box: None,
    }
}
