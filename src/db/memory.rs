// db/memory.rs
//
// In-process store used by the unit and router tests. Every write applies the
// same conditions as the SQL in the Postgres implementation under one lock.
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use sqlx::error::{DatabaseError, ErrorKind};
use sqlx::Error;
use uuid::Uuid;

use super::jobdb::{JobExt, JobFilter, JobQuery, SortOrder};
use super::servicedb::ServiceExt;
use super::statsdb::StatsExt;
use super::userdb::UserExt;
use crate::models::jobmodel::*;
use crate::models::servicemodel::*;
use crate::models::statsmodel::*;
use crate::models::usermodel::*;

/// Stand-in for the Postgres error raised by a unique index.
#[derive(Debug)]
struct UniqueViolation(&'static str);

impl fmt::Display for UniqueViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "duplicate key value violates unique constraint \"{}\"", self.0)
    }
}

impl std::error::Error for UniqueViolation {}

impl DatabaseError for UniqueViolation {
    fn message(&self) -> &str {
        "duplicate key value violates unique constraint"
    }

    fn constraint(&self) -> Option<&str> {
        Some(self.0)
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::UniqueViolation
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    services: Vec<ServiceDefinition>,
    jobs: Vec<Job>,
    reviews: Vec<WorkerReview>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        match self.tables.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn add_service(&self, code: &str, pricing_model: PricingModel, price_per_hour: Option<i64>) -> ServiceDefinition {
        let now = Utc::now();
        let service = ServiceDefinition {
            id: Uuid::new_v4(),
            code: code.to_string(),
            service_name: code.replace('_', " "),
            description: format!("{} service", code),
            pricing_model,
            base_price: 0,
            price_per_hour,
            front_load: None,
            top_load: None,
            created_at: now,
            updated_at: now,
        };
        self.lock().services.push(service.clone());
        service
    }

    pub fn add_user(&self, role: UserRole, services: Vec<Uuid>, worker_status: Option<WorkerStatus>) -> User {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let user = User {
            id,
            full_name: format!("{} {}", role.to_str(), &id.to_string()[..8]),
            email: format!("{}@tidyhome.test", id),
            password: String::new(),
            phone_number: None,
            address: None,
            role,
            balance: 0,
            identity_number: None,
            services,
            worker_status,
            rating: if role == UserRole::Worker { Some(DEFAULT_WORKER_RATING) } else { None },
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };
        self.lock().users.push(user.clone());
        user
    }

    /// Inserts or replaces a job row as-is.
    pub fn put_job(&self, job: Job) {
        let mut tables = self.lock();
        tables.jobs.retain(|existing| existing.id != job.id);
        tables.jobs.push(job);
    }

    pub fn user(&self, user_id: Uuid) -> Option<User> {
        self.lock().users.iter().find(|u| u.id == user_id).cloned()
    }

    pub fn job(&self, job_id: Uuid) -> Option<Job> {
        self.lock().jobs.iter().find(|j| j.id == job_id).cloned()
    }
}

fn compare_jobs(a: &Job, b: &Job, order: SortOrder) -> Ordering {
    let primary = a.scheduled_time.cmp(&b.scheduled_time);
    let primary = match order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl UserExt for MemoryStore {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, Error> {
        Ok(self.user(user_id))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let email = email.to_lowercase();
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_users_by_ids(&self, user_ids: &[Uuid]) -> Result<Vec<User>, Error> {
        Ok(self
            .lock()
            .users
            .iter()
            .filter(|u| user_ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn save_user(&self, new_user: NewUser) -> Result<User, Error> {
        let mut tables = self.lock();
        let email = new_user.email.to_lowercase();
        if tables.users.iter().any(|u| u.email == email) {
            return Err(Error::Database(Box::new(UniqueViolation("users_email_key"))));
        }

        let is_worker = new_user.role == UserRole::Worker;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            full_name: new_user.full_name,
            email,
            password: new_user.password,
            phone_number: new_user.phone_number,
            address: new_user.address,
            role: new_user.role,
            balance: 0,
            identity_number: new_user.identity_number,
            services: new_user.services,
            worker_status: is_worker.then_some(WorkerStatus::Pending),
            rating: is_worker.then_some(DEFAULT_WORKER_RATING),
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_workers_by_status(&self, status: WorkerStatus) -> Result<Vec<User>, Error> {
        Ok(self
            .lock()
            .users
            .iter()
            .filter(|u| u.is_worker() && u.worker_status == Some(status))
            .cloned()
            .collect())
    }

    async fn update_worker_status(
        &self,
        worker_id: Uuid,
        status: WorkerStatus,
        rejection_reason: Option<String>,
    ) -> Result<Option<User>, Error> {
        let mut tables = self.lock();
        let Some(user) = tables
            .users
            .iter_mut()
            .find(|u| u.id == worker_id && u.is_worker())
        else {
            return Ok(None);
        };
        user.worker_status = Some(status);
        user.rejection_reason = rejection_reason;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn get_worker_reviews(&self, worker_id: Uuid) -> Result<Vec<WorkerReview>, Error> {
        let mut reviews: Vec<WorkerReview> = self
            .lock()
            .reviews
            .iter()
            .filter(|r| r.worker_id == worker_id)
            .cloned()
            .collect();
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reviews)
    }
}

#[async_trait]
impl ServiceExt for MemoryStore {
    async fn get_services(&self) -> Result<Vec<ServiceDefinition>, Error> {
        let mut services = self.lock().services.clone();
        services.sort_by(|a, b| a.service_name.cmp(&b.service_name));
        Ok(services)
    }

    async fn get_service_by_id(&self, service_id: Uuid) -> Result<Option<ServiceDefinition>, Error> {
        Ok(self.lock().services.iter().find(|s| s.id == service_id).cloned())
    }

    async fn update_service_price(
        &self,
        service_id: Uuid,
        update: &ServicePriceUpdate,
    ) -> Result<Option<ServiceDefinition>, Error> {
        let mut tables = self.lock();
        let Some(service) = tables.services.iter_mut().find(|s| s.id == service_id) else {
            return Ok(None);
        };
        if let Some(base_price) = update.base_price {
            service.base_price = base_price;
        }
        if update.price_per_hour.is_some() {
            service.price_per_hour = update.price_per_hour;
        }
        if update.front_load.is_some() {
            service.front_load = update.front_load;
        }
        if update.top_load.is_some() {
            service.top_load = update.top_load;
        }
        service.updated_at = Utc::now();
        Ok(Some(service.clone()))
    }
}

#[async_trait]
impl JobExt for MemoryStore {
    async fn create_job(&self, new_job: NewJob) -> Result<Job, Error> {
        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            client_id: new_job.client_id,
            worker_id: None,
            service_id: new_job.service_id,
            address: new_job.address,
            duration_hours: new_job.duration_hours,
            scheduled_time: new_job.scheduled_time,
            status: JobStatus::Pending,
            price: new_job.price,
            payment_status: PaymentStatus::Unpaid,
            rating: None,
            service_comments: None,
            confirmation_time: None,
            completion_time: None,
            created_at: now,
            updated_at: now,
        };
        self.lock().jobs.push(job.clone());
        Ok(job)
    }

    async fn get_job_by_id(&self, job_id: Uuid) -> Result<Option<Job>, Error> {
        Ok(self.job(job_id))
    }

    async fn query_jobs(&self, query: &JobQuery) -> Result<(Vec<Job>, i64), Error> {
        let mut jobs: Vec<Job> = self
            .lock()
            .jobs
            .iter()
            .filter(|job| query.filter.matches(job))
            .cloned()
            .collect();
        let total = jobs.len() as i64;
        jobs.sort_by(|a, b| compare_jobs(a, b, query.order));

        let page = jobs
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, Error> {
        let mut jobs: Vec<Job> = self
            .lock()
            .jobs
            .iter()
            .filter(|job| filter.matches(job))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(jobs)
    }

    async fn claim_job(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        capabilities: &[Uuid],
    ) -> Result<Option<Job>, Error> {
        let mut tables = self.lock();
        let Some(job) = tables.jobs.iter_mut().find(|j| {
            j.id == job_id
                && j.status == JobStatus::Pending
                && j.worker_id.is_none()
                && capabilities.contains(&j.service_id)
        }) else {
            return Ok(None);
        };
        let now = Utc::now();
        job.worker_id = Some(worker_id);
        job.status = JobStatus::Accepted;
        job.confirmation_time = Some(now);
        job.updated_at = now;
        Ok(Some(job.clone()))
    }

    async fn update_job_status(
        &self,
        job_id: Uuid,
        expected: JobStatus,
        target: JobStatus,
    ) -> Result<Option<Job>, Error> {
        let mut tables = self.lock();
        let Some(job) = tables
            .jobs
            .iter_mut()
            .find(|j| j.id == job_id && j.status == expected)
        else {
            return Ok(None);
        };
        job.status = target;
        job.updated_at = Utc::now();
        Ok(Some(job.clone()))
    }

    async fn complete_job(&self, job_id: Uuid, expected: JobStatus) -> Result<Option<Job>, Error> {
        let mut tables = self.lock();
        let Some(index) = tables
            .jobs
            .iter()
            .position(|j| j.id == job_id && j.status == expected && j.worker_id.is_some())
        else {
            return Ok(None);
        };

        let (worker_id, price) = {
            let job = &tables.jobs[index];
            (job.worker_id, job.price)
        };
        let Some(worker) = tables.users.iter_mut().find(|u| Some(u.id) == worker_id) else {
            return Err(Error::RowNotFound);
        };
        // BIGINT overflow aborts the transaction in Postgres.
        let Some(balance) = worker.balance.checked_add(price) else {
            return Err(Error::Protocol("bigint out of range".to_string()));
        };
        worker.balance = balance;

        let now = Utc::now();
        let job = &mut tables.jobs[index];
        job.status = JobStatus::Completed;
        job.payment_status = PaymentStatus::Paid;
        job.completion_time = Some(now);
        job.updated_at = now;
        Ok(Some(job.clone()))
    }

    async fn cancel_job(&self, job_id: Uuid, expected: JobStatus) -> Result<Option<Job>, Error> {
        self.update_job_status(job_id, expected, JobStatus::Canceled).await
    }

    async fn rate_job(
        &self,
        job_id: Uuid,
        worker_id: Uuid,
        rating: &JobRating,
    ) -> Result<Option<Job>, Error> {
        let mut tables = self.lock();
        let Some(index) = tables.jobs.iter().position(|j| {
            j.id == job_id
                && j.status == JobStatus::Completed
                && j.rating.is_none()
                && j.worker_id == Some(worker_id)
        }) else {
            return Ok(None);
        };

        let now = Utc::now();
        {
            let job = &mut tables.jobs[index];
            job.rating = Some(rating.service_rating);
            job.service_comments = rating.service_comment.clone();
            job.updated_at = now;
        }

        tables.reviews.push(WorkerReview {
            id: Uuid::new_v4(),
            worker_id,
            job_id,
            rating: rating.worker_rating,
            comment: rating.worker_comment.clone(),
            created_at: now,
        });

        if let Some(worker) = tables.users.iter_mut().find(|u| u.id == worker_id) {
            let previous = worker.current_rating();
            worker.rating = Some((previous + rating.worker_rating as f64) / 2.0);
            worker.updated_at = now;
        }

        Ok(Some(tables.jobs[index].clone()))
    }
}

/// Price sum and row count per key over the jobs `include` accepts.
fn tally<K, F, I>(jobs: &[Job], key: F, include: I) -> HashMap<K, (i64, i64)>
where
    K: std::hash::Hash + Eq,
    F: Fn(&Job) -> Option<K>,
    I: Fn(&Job) -> bool,
{
    let mut totals: HashMap<K, (i64, i64)> = HashMap::new();
    for job in jobs {
        if !include(job) {
            continue;
        }
        if let Some(k) = key(job) {
            let entry = totals.entry(k).or_insert((0, 0));
            entry.0 += job.price;
            entry.1 += 1;
        }
    }
    totals
}

fn is_paid(job: &Job) -> bool {
    job.payment_status == PaymentStatus::Paid
}

impl Tables {
    fn service_name(&self, service_id: Uuid) -> String {
        self.services
            .iter()
            .find(|s| s.id == service_id)
            .map(|s| s.service_name.clone())
            .unwrap_or_default()
    }

    fn name_and_email(&self, user_id: Uuid) -> (String, String) {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| (u.full_name.clone(), u.email.clone()))
            .unwrap_or_default()
    }
}

#[async_trait]
impl StatsExt for MemoryStore {
    async fn monthly_revenue(&self) -> Result<Vec<MonthlyRevenue>, Error> {
        let tables = self.lock();
        let mut months: BTreeMap<(i32, i32), (i64, i64)> = BTreeMap::new();
        for job in tables.jobs.iter().filter(|j| j.status == JobStatus::Completed && is_paid(j)) {
            let Some(completed_at) = job.completion_time else {
                continue;
            };
            let entry = months
                .entry((completed_at.year(), completed_at.month() as i32))
                .or_insert((0, 0));
            entry.0 += job.price;
            entry.1 += 1;
        }

        Ok(months
            .into_iter()
            .map(|((year, month), (total_revenue, count))| MonthlyRevenue {
                year,
                month,
                total_revenue,
                count,
            })
            .collect())
    }

    async fn total_revenue(&self) -> Result<i64, Error> {
        Ok(self.lock().jobs.iter().filter(|j| is_paid(j)).map(|j| j.price).sum())
    }

    async fn revenue_by_service(&self) -> Result<Vec<ServiceRevenue>, Error> {
        let tables = self.lock();
        let mut rows: Vec<ServiceRevenue> = tally(&tables.jobs, |j| Some(j.service_id), is_paid)
            .into_iter()
            .map(|(service_id, (total_revenue, job_count))| ServiceRevenue {
                service_id,
                service_name: tables.service_name(service_id),
                total_revenue,
                job_count,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.total_revenue
                .cmp(&a.total_revenue)
                .then(a.service_id.cmp(&b.service_id))
        });
        Ok(rows)
    }

    async fn most_booked_services(&self) -> Result<Vec<ServiceBookings>, Error> {
        let tables = self.lock();
        let mut rows: Vec<ServiceBookings> = tally(&tables.jobs, |j| Some(j.service_id), |_| true)
            .into_iter()
            .map(|(service_id, (_, job_count))| ServiceBookings {
                service_id,
                service_name: tables.service_name(service_id),
                job_count,
            })
            .collect();
        rows.sort_by(|a, b| b.job_count.cmp(&a.job_count).then(a.service_id.cmp(&b.service_id)));
        Ok(rows)
    }

    async fn worker_rankings(&self) -> Result<Vec<WorkerRanking>, Error> {
        let tables = self.lock();
        let mut rows: Vec<WorkerRanking> = tally(&tables.jobs, |j| j.worker_id, |_| true)
            .into_iter()
            .map(|(worker_id, (_, job_count))| {
                let (full_name, email) = tables.name_and_email(worker_id);
                WorkerRanking {
                    worker_id,
                    full_name,
                    email,
                    job_count,
                }
            })
            .collect();
        rows.sort_by(|a, b| b.job_count.cmp(&a.job_count).then(a.worker_id.cmp(&b.worker_id)));
        Ok(rows)
    }

    async fn top_clients(&self) -> Result<Vec<ClientSpend>, Error> {
        let tables = self.lock();
        let mut rows: Vec<ClientSpend> = tally(&tables.jobs, |j| Some(j.client_id), is_paid)
            .into_iter()
            .map(|(client_id, (total_spent, job_count))| {
                let (full_name, email) = tables.name_and_email(client_id);
                ClientSpend {
                    client_id,
                    full_name,
                    email,
                    total_spent,
                    job_count,
                }
            })
            .collect();
        rows.sort_by(|a, b| b.total_spent.cmp(&a.total_spent).then(a.client_id.cmp(&b.client_id)));
        Ok(rows)
    }

    async fn worker_job_totals(
        &self,
        worker_id: Uuid,
        income_since: DateTime<Utc>,
    ) -> Result<WorkerJobTotals, Error> {
        let tables = self.lock();
        let completed: Vec<&Job> = tables
            .jobs
            .iter()
            .filter(|j| j.worker_id == Some(worker_id) && j.status == JobStatus::Completed)
            .collect();
        let month_income: i64 = completed
            .iter()
            .filter(|j| j.completion_time.is_some_and(|t| t >= income_since))
            .map(|j| j.price)
            .sum();
        Ok(WorkerJobTotals {
            completed_jobs: completed.len() as i64,
            month_income,
        })
    }

    async fn worker_rating_counts(&self, worker_id: Uuid) -> Result<Vec<RatingCount>, Error> {
        let mut counts: BTreeMap<i32, i64> = BTreeMap::new();
        for rating in self
            .lock()
            .jobs
            .iter()
            .filter(|j| j.worker_id == Some(worker_id))
            .filter_map(|j| j.rating)
        {
            *counts.entry(rating).or_insert(0) += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(rating, count)| RatingCount { rating, count })
            .collect())
    }
}
