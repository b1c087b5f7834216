use criterion::{criterion_group, criterion_main, Criterion};
use rackyard_core::{
    pivot, qr, utilization, HarvestDate, LaneKey, OccupancyFilter, Pallet, PalletCode, SlotRecord,
};
use std::hint::black_box;

/// One warehouse type, 4 racks of 6 floors x 4 letters x 8 positions, every
/// third slot free.
fn bench_records() -> Vec<SlotRecord> {
    let mut records = Vec::new();
    let mut key = 0;
    for rack in 1..=4 {
        for floor in 1..=6 {
            for letter in ["A", "B", "C", "D"] {
                let lane = LaneKey::new("COLD", floor, rack, letter);
                for position in 1..=8 {
                    key += 1;
                    let slot = lane.slot(position);
                    if key % 3 == 0 {
                        records.push(SlotRecord::free(slot));
                    } else {
                        let pallet = Pallet {
                            key,
                            code: PalletCode::from_stored(format!("{:08}", key)),
                            description: "box 18kg".to_string(),
                            variety: if key % 2 == 0 { "Fuji" } else { "Gala" }.to_string(),
                            market: "EU".to_string(),
                            harvest_date: HarvestDate::from_stored("20240115"),
                        };
                        records.push(SlotRecord::occupied(slot, pallet));
                    }
                }
            }
        }
    }
    records
}

fn bench_occupancy(c: &mut Criterion) {
    let records = bench_records();
    let filter = OccupancyFilter {
        varieties: ["Fuji".to_string()].into_iter().collect(),
        ..Default::default()
    };

    c.bench_function("occupancy/pivot_filtered", |b| {
        b.iter(|| {
            let grids = pivot(black_box(&records), &filter);
            black_box(grids.len());
        });
    });

    c.bench_function("occupancy/utilization", |b| {
        b.iter(|| black_box(utilization(black_box(&records))));
    });
}

fn bench_qr_parse(c: &mut Criterion) {
    c.bench_function("qr/parse", |b| {
        b.iter(|| {
            let record = qr::parse(black_box("Fuji,box 18kg,EU,20240115,12345678\r\n"));
            black_box(record.is_ok());
        });
    });
}

criterion_group!(benches, bench_occupancy, bench_qr_parse);
criterion_main!(benches);
