// benches/order_workflow.rs

use chrono::Duration;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use storefront::auth::{Identity, TokenIssuer};
use storefront::files::{MemoryFileStore, UploadedFile};
use storefront::models::{CategoryRequest, NewProduct, ProductType};
use storefront::pipeline::{ContextData, Pipeline, PipelineControl, PipelineError};
use storefront::services::Services;
use storefront::store::MemoryStore;
use tokio::runtime::Runtime;
use uuid::Uuid;

struct Fixture {
  services: Services,
  buyer: Uuid,
  admin: Identity,
  product_id: Uuid,
}

fn fixture(rt: &Runtime) -> Fixture {
  rt.block_on(async {
    let store = Arc::new(MemoryStore::new());
    let files = Arc::new(MemoryFileStore::default());
    let tokens = TokenIssuer::new("bench-secret", Duration::hours(1));
    let services = Services::new(store, files, tokens, Duration::hours(24)).unwrap();

    let category = services
      .catalog
      .create_category(CategoryRequest {
        name: "Bench".into(),
        ..Default::default()
      })
      .await
      .unwrap();
    let product = services
      .catalog
      .create_product(
        Uuid::new_v4(),
        NewProduct {
          title: "Bench Kit".into(),
          description: String::new(),
          category_id: category.id,
          product_type: ProductType::Template,
          price_cents: 4_900,
          discount_price_cents: Some(3_900),
          demo_url: None,
          file_url: None,
          tech_stack: vec![],
          features: vec![],
          requirements: vec![],
          is_active: true,
        },
        None,
      )
      .await
      .unwrap();

    Fixture {
      services,
      buyer: Uuid::new_v4(),
      admin: Identity::admin(Uuid::new_v4()),
      product_id: product.id,
    }
  })
}

fn proof() -> UploadedFile {
  UploadedFile::new("proof.png", "image/png", vec![7u8; 2048])
}

fn bench_checkout(c: &mut Criterion) {
  let mut group = c.benchmark_group("Checkout");
  let rt = Runtime::new().unwrap();
  let fx = fixture(&rt);

  group.throughput(Throughput::Elements(1));
  group.bench_function("create_order", |b| {
    b.to_async(&rt).iter(|| {
      let orders = fx.services.orders.clone();
      let (buyer, product_id) = (fx.buyer, fx.product_id);
      async move { orders.create_order(buyer, product_id, 1, None).await.unwrap() }
    })
  });
  group.finish();
}

fn bench_full_settlement(c: &mut Criterion) {
  let mut group = c.benchmark_group("CheckoutToApproval");
  let rt = Runtime::new().unwrap();
  let fx = fixture(&rt);

  group.throughput(Throughput::Elements(3));
  group.bench_function("create_upload_approve", |b| {
    b.to_async(&rt).iter(|| {
      let orders = fx.services.orders.clone();
      let (buyer, product_id, admin) = (fx.buyer, fx.product_id, fx.admin);
      async move {
        let order = orders.create_order(buyer, product_id, 1, None).await.unwrap();
        orders.upload_payment_proof(buyer, order.id, proof()).await.unwrap();
        orders.approve_payment(admin, order.id).await.unwrap()
      }
    })
  });
  group.finish();
}

fn bench_runner_overhead(c: &mut Criterion) {
  let mut group = c.benchmark_group("RunnerOverhead");
  let rt = Runtime::new().unwrap();

  for num_steps in [1usize, 5, 10] {
    let names: Vec<String> = (0..num_steps).map(|i| format!("step_{}", i)).collect();
    let defs: Vec<(&str, bool)> = names.iter().map(|n| (n.as_str(), false)).collect();
    let mut pipeline = Pipeline::<u64, PipelineError>::new("bench", &defs);
    for name in &names {
      pipeline
        .on(name, |ctx: ContextData<u64>| async move {
          ctx.update(|n| *n += 1);
          Ok::<_, PipelineError>(PipelineControl::Continue)
        })
        .unwrap();
    }
    let pipeline = Arc::new(pipeline);

    group.throughput(Throughput::Elements(num_steps as u64));
    group.bench_with_input(BenchmarkId::new("noop_steps", num_steps), &num_steps, |b, _| {
      b.to_async(&rt).iter_batched(
        || ContextData::new(0u64),
        |ctx| {
          let p = pipeline.clone();
          async move { p.run(ctx).await.unwrap() }
        },
        criterion::BatchSize::SmallInput,
      );
    });
  }
  group.finish();
}

criterion_group!(benches, bench_checkout, bench_full_settlement, bench_runner_overhead);
criterion_main!(benches);
