// service/stats_service.rs
//
// Read-side reports. The store aggregates; this layer only shapes the worker
// dashboard. Nothing is cached, every call recomputes.
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    db::db::MarketStore,
    models::statsmodel::*,
    service::error::ServiceError,
};

/// First instant of the UTC calendar month containing `now`.
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// Good jobs are rated 4 or 5, average jobs 1 to 3.
pub fn worker_dashboard(totals: WorkerJobTotals, rating_counts: &[RatingCount]) -> WorkerDashboard {
    let ratings: BTreeMap<i32, i64> = rating_counts
        .iter()
        .map(|row| (row.rating, row.count))
        .collect();

    let good_jobs = ratings.range(4..).map(|(_, count)| count).sum();
    let average_jobs = ratings.range(1..4).map(|(_, count)| count).sum();

    WorkerDashboard {
        completed_jobs: totals.completed_jobs,
        month_income: totals.month_income,
        ratings,
        good_jobs,
        average_jobs,
    }
}

#[derive(Debug, Clone)]
pub struct StatsService {
    db_client: Arc<dyn MarketStore>,
}

impl StatsService {
    pub fn new(db_client: Arc<dyn MarketStore>) -> Self {
        Self { db_client }
    }

    pub async fn monthly_revenue(&self) -> Result<Vec<MonthlyRevenue>, ServiceError> {
        Ok(self.db_client.monthly_revenue().await?)
    }

    pub async fn total_revenue(&self) -> Result<i64, ServiceError> {
        Ok(self.db_client.total_revenue().await?)
    }

    pub async fn revenue_by_service(&self) -> Result<Vec<ServiceRevenue>, ServiceError> {
        Ok(self.db_client.revenue_by_service().await?)
    }

    pub async fn most_booked_services(&self) -> Result<Vec<ServiceBookings>, ServiceError> {
        Ok(self.db_client.most_booked_services().await?)
    }

    pub async fn worker_rankings(&self) -> Result<Vec<WorkerRanking>, ServiceError> {
        Ok(self.db_client.worker_rankings().await?)
    }

    pub async fn top_clients(&self) -> Result<Vec<ClientSpend>, ServiceError> {
        Ok(self.db_client.top_clients().await?)
    }

    pub async fn worker_dashboard(&self, worker_id: Uuid) -> Result<WorkerDashboard, ServiceError> {
        let totals = self
            .db_client
            .worker_job_totals(worker_id, month_start(Utc::now()))
            .await?;
        let rating_counts = self.db_client.worker_rating_counts(worker_id).await?;
        Ok(worker_dashboard(totals, &rating_counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::memory::MemoryStore,
        models::{
            jobmodel::{Job, JobStatus, PaymentStatus},
            servicemodel::PricingModel,
            usermodel::UserRole,
        },
    };

    fn job(service_id: Uuid, client_id: Uuid, worker_id: Option<Uuid>, price: i64) -> Job {
        let now = Utc::now();
        Job {
            id: Uuid::new_v4(),
            client_id,
            worker_id,
            service_id,
            address: "7 Tran Phu".to_string(),
            duration_hours: 1.0,
            scheduled_time: now,
            status: JobStatus::Pending,
            price,
            payment_status: PaymentStatus::Unpaid,
            rating: None,
            service_comments: None,
            confirmation_time: None,
            completion_time: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn completed(mut job: Job, at: DateTime<Utc>, rating: Option<i32>) -> Job {
        job.status = JobStatus::Completed;
        job.payment_status = PaymentStatus::Paid;
        job.completion_time = Some(at);
        job.rating = rating;
        job
    }

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap()
    }

    fn stats_over(store: &Arc<MemoryStore>, jobs: Vec<Job>) -> StatsService {
        for job in jobs {
            store.put_job(job);
        }
        StatsService::new(store.clone())
    }

    #[tokio::test]
    async fn test_monthly_revenue_groups_by_year_and_month() {
        let store = Arc::new(MemoryStore::new());
        let s = Uuid::new_v4();
        let c = Uuid::new_v4();
        let w = Some(Uuid::new_v4());
        let stats = stats_over(
            &store,
            vec![
                completed(job(s, c, w, 100), at(2023, 3, 2), None),
                completed(job(s, c, w, 200), at(2024, 3, 5), None),
                completed(job(s, c, w, 300), at(2024, 3, 28), None),
                job(s, c, None, 999),
            ],
        );

        assert_eq!(
            stats.monthly_revenue().await.unwrap(),
            vec![
                MonthlyRevenue { year: 2023, month: 3, total_revenue: 100, count: 1 },
                MonthlyRevenue { year: 2024, month: 3, total_revenue: 500, count: 2 },
            ]
        );
        assert_eq!(stats.total_revenue().await.unwrap(), 600);
    }

    #[tokio::test]
    async fn test_rankings_skip_unassigned_and_break_ties_by_id() {
        let store = Arc::new(MemoryStore::new());
        let s = Uuid::new_v4();
        let c = Uuid::new_v4();
        let a = store.add_user(UserRole::Worker, vec![s], None).id;
        let b = store.add_user(UserRole::Worker, vec![s], None).id;
        let stats = stats_over(
            &store,
            vec![job(s, c, Some(a), 1), job(s, c, Some(b), 1), job(s, c, None, 1)],
        );

        let rows = stats.worker_rankings().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].worker_id < rows[1].worker_id);
        assert!(rows.iter().all(|r| r.job_count == 1));
    }

    #[tokio::test]
    async fn test_service_and_client_aggregates() {
        let store = Arc::new(MemoryStore::new());
        let cleaning = store.add_service("cleaning", PricingModel::Hourly, None);
        let ac = store.add_service("ac_cleaning", PricingModel::LoadTier, None);
        let alice = store.add_user(UserRole::Client, vec![], None);
        let bob = store.add_user(UserRole::Client, vec![], None);
        let w = Some(Uuid::new_v4());
        let when = at(2024, 6, 1);
        let stats = stats_over(
            &store,
            vec![
                completed(job(cleaning.id, alice.id, w, 200_000), when, None),
                completed(job(cleaning.id, alice.id, w, 200_000), when, None),
                completed(job(ac.id, bob.id, w, 600_000), when, None),
                job(cleaning.id, bob.id, None, 100_000),
            ],
        );

        let revenue = stats.revenue_by_service().await.unwrap();
        assert_eq!(revenue[0].service_id, ac.id);
        assert_eq!(revenue[0].service_name, ac.service_name);
        assert_eq!(revenue[0].total_revenue, 600_000);
        assert_eq!(revenue[1].total_revenue, 400_000);

        let booked = stats.most_booked_services().await.unwrap();
        assert_eq!(booked[0].service_id, cleaning.id);
        assert_eq!(booked[0].job_count, 3);

        let clients = stats.top_clients().await.unwrap();
        assert_eq!(clients[0].client_id, bob.id);
        assert_eq!(clients[0].email, bob.email);
        assert_eq!(clients[0].total_spent, 600_000);
        assert_eq!(clients[1].job_count, 2);
    }

    #[test]
    fn test_worker_dashboard_buckets_ratings() {
        let totals = WorkerJobTotals { completed_jobs: 3, month_income: 350_000 };
        let counts = [
            RatingCount { rating: 3, count: 1 },
            RatingCount { rating: 4, count: 1 },
            RatingCount { rating: 5, count: 2 },
        ];

        let dashboard = worker_dashboard(totals, &counts);
        assert_eq!(dashboard.completed_jobs, 3);
        assert_eq!(dashboard.month_income, 350_000);
        assert_eq!(dashboard.good_jobs, 3);
        assert_eq!(dashboard.average_jobs, 1);
        assert_eq!(dashboard.ratings.get(&5), Some(&2));
    }

    #[test]
    fn test_month_start_is_first_of_month_utc() {
        assert_eq!(month_start(at(2024, 6, 20)), Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_worker_dashboard_reads_current_month_income() {
        let store = Arc::new(MemoryStore::new());
        let cleaning = store.add_service("cleaning", PricingModel::Hourly, None);
        let client = store.add_user(UserRole::Client, vec![], None);
        let worker = store.add_user(UserRole::Worker, vec![cleaning.id], None);
        let this_month = month_start(Utc::now());
        let stats = stats_over(
            &store,
            vec![
                completed(job(cleaning.id, client.id, Some(worker.id), 200_000), Utc::now(), Some(5)),
                completed(job(cleaning.id, client.id, Some(worker.id), 150_000), Utc::now(), Some(3)),
                completed(
                    job(cleaning.id, client.id, Some(worker.id), 900_000),
                    this_month - chrono::Duration::days(2),
                    Some(4),
                ),
                job(cleaning.id, client.id, Some(worker.id), 50_000),
                completed(job(cleaning.id, client.id, None, 70_000), Utc::now(), Some(1)),
            ],
        );

        let dashboard = stats.worker_dashboard(worker.id).await.unwrap();
        assert_eq!(dashboard.completed_jobs, 3);
        assert_eq!(dashboard.month_income, 350_000);
        assert_eq!(dashboard.good_jobs, 2);
        assert_eq!(dashboard.average_jobs, 1);
        assert_eq!(dashboard.ratings.get(&3), Some(&1));
    }
}
