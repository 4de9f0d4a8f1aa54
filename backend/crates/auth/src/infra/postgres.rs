//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::error::conversions::is_unique_violation;
use kernel::i18n::{Language, LocalizedText};
use kernel::id::UserId;
use kernel::pagination::PageRequest;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::domain::entity::{provider_profile::ProviderProfile, user::User};
use crate::domain::repository::{
    ProviderFilter, ProviderProfileRepository, UserFilter, UserRepository,
};
use crate::domain::value_object::{
    email::Email, user_password::UserPassword, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = r#"
    u.id,
    u.email,
    u.password_hash,
    u.first_name,
    u.last_name,
    u.phone,
    u.avatar,
    u.role,
    u.is_verified,
    u.is_active,
    u.language,
    u.oauth_provider,
    u.oauth_subject,
    u.last_login_at,
    u.created_at,
    u.updated_at
"#;

fn like_pattern(term: &Option<String>) -> Option<String> {
    term.as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| format!("%{}%", t.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")))
}

fn map_create_error(err: sqlx::Error) -> AuthError {
    if is_unique_violation(&err) {
        AuthError::EmailTaken
    } else {
        AuthError::Database(err)
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User, profile: Option<&ProviderProfile>) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (
                id,
                email,
                password_hash,
                first_name,
                last_name,
                phone,
                avatar,
                role,
                is_verified,
                is_active,
                language,
                oauth_provider,
                oauth_subject,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.email.as_str())
        .bind(user.password.as_ref().map(|p| p.as_phc_string()))
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(&user.avatar)
        .bind(user.role.id())
        .bind(user.is_verified)
        .bind(user.is_active)
        .bind(user.language.code())
        .bind(&user.oauth_provider)
        .bind(&user.oauth_subject)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(map_create_error)?;

        if let Some(profile) = profile {
            insert_profile(&mut tx, profile).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.email = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_oauth(&self, provider: &str, subject: &str) -> AuthResult<Option<User>> {
        let sql = format!(
            r#"
                SELECT {USER_COLUMNS}
                FROM users u
                WHERE u.oauth_provider = $1 AND u.oauth_subject = $2
            "#
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(provider)
            .bind(subject)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                email = $2,
                password_hash = $3,
                first_name = $4,
                last_name = $5,
                phone = $6,
                avatar = $7,
                role = $8,
                is_verified = $9,
                is_active = $10,
                language = $11,
                oauth_provider = $12,
                oauth_subject = $13,
                last_login_at = $14,
                updated_at = $15
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(user.email.as_str())
        .bind(user.password.as_ref().map(|p| p.as_phc_string()))
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(&user.avatar)
        .bind(user.role.id())
        .bind(user.is_verified)
        .bind(user.is_active)
        .bind(user.language.code())
        .bind(&user.oauth_provider)
        .bind(&user.oauth_subject)
        .bind(user.last_login_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self, filter: &UserFilter, page: PageRequest) -> AuthResult<(Vec<User>, u64)> {
        let role = filter.role.map(|r| r.id());
        let search = like_pattern(&filter.search);

        const WHERE: &str = r#"
            WHERE ($1::SMALLINT IS NULL OR u.role = $1)
              AND ($2::TEXT IS NULL
                   OR u.email ILIKE $2
                   OR u.first_name ILIKE $2
                   OR u.last_name ILIKE $2)
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM users u {WHERE}"))
            .bind(role)
            .bind(&search)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            r#"
                SELECT {USER_COLUMNS}
                FROM users u
                {WHERE}
                ORDER BY u.created_at DESC LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(role)
            .bind(&search)
            .bind(page.sql_limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let users = rows
            .into_iter()
            .map(UserRow::into_user)
            .collect::<AuthResult<Vec<_>>>()?;
        Ok((users, total.max(0) as u64))
    }
}

// ============================================================================
// Provider Profile Repository Implementation
// ============================================================================

async fn insert_profile(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    profile: &ProviderProfile,
) -> AuthResult<()> {
    sqlx::query(
        r#"
        INSERT INTO provider_profiles (
            user_id,
            business_name,
            description,
            address,
            city,
            website,
            experience_years,
            service_radius_km,
            created_at,
            updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(profile.user_id.as_uuid())
    .bind(&profile.business_name)
    .bind(Json(&profile.description))
    .bind(&profile.address)
    .bind(&profile.city)
    .bind(&profile.website)
    .bind(profile.experience_years)
    .bind(profile.service_radius_km)
    .bind(profile.created_at)
    .bind(profile.updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

impl ProviderProfileRepository for PgAuthRepository {
    async fn find_by_user_id(&self, user_id: &UserId) -> AuthResult<Option<ProviderProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT
                user_id,
                business_name,
                description,
                address,
                city,
                website,
                experience_years,
                service_radius_km,
                created_at,
                updated_at
            FROM provider_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ProfileRow::into_profile))
    }

    async fn upsert(&self, profile: &ProviderProfile) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO provider_profiles (
                user_id,
                business_name,
                description,
                address,
                city,
                website,
                experience_years,
                service_radius_km,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (user_id) DO UPDATE SET
                business_name = EXCLUDED.business_name,
                description = EXCLUDED.description,
                address = EXCLUDED.address,
                city = EXCLUDED.city,
                website = EXCLUDED.website,
                experience_years = EXCLUDED.experience_years,
                service_radius_km = EXCLUDED.service_radius_km,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(profile.user_id.as_uuid())
        .bind(&profile.business_name)
        .bind(Json(&profile.description))
        .bind(&profile.address)
        .bind(&profile.city)
        .bind(&profile.website)
        .bind(profile.experience_years)
        .bind(profile.service_radius_km)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_providers(
        &self,
        filter: &ProviderFilter,
        page: PageRequest,
    ) -> AuthResult<(Vec<(User, ProviderProfile)>, u64)> {
        let city = filter
            .city
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let search = like_pattern(&filter.search);

        const FROM: &str = r#"
            FROM users u
            JOIN provider_profiles p ON p.user_id = u.id
            WHERE u.role = 1
              AND u.is_active
              AND ($1::TEXT IS NULL OR p.city ILIKE $1)
              AND ($2::TEXT IS NULL
                   OR u.first_name ILIKE $2
                   OR u.last_name ILIKE $2
                   OR p.business_name ILIKE $2)
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) {FROM}"))
            .bind(&city)
            .bind(&search)
            .fetch_one(&self.pool)
            .await?;

        let sql = format!(
            r#"
            SELECT {USER_COLUMNS},
                p.business_name AS p_business_name,
                p.description AS p_description,
                p.address AS p_address,
                p.city AS p_city,
                p.website AS p_website,
                p.experience_years AS p_experience_years,
                p.service_radius_km AS p_service_radius_km,
                p.created_at AS p_created_at,
                p.updated_at AS p_updated_at
            {FROM}
            ORDER BY u.created_at DESC
            LIMIT $3 OFFSET $4
            "#
        );
        let rows = sqlx::query_as::<_, ProviderRow>(&sql)
            .bind(&city)
            .bind(&search)
            .bind(page.sql_limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let providers = rows
            .into_iter()
            .map(ProviderRow::into_pair)
            .collect::<AuthResult<Vec<_>>>()?;
        Ok((providers, total.max(0) as u64))
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: Option<String>,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    avatar: Option<String>,
    role: i16,
    is_verified: bool,
    is_active: bool,
    language: String,
    oauth_provider: Option<String>,
    oauth_subject: Option<String>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let role = UserRole::from_id(self.role)
            .ok_or_else(|| AuthError::Internal(format!("Invalid role id: {}", self.role)))?;
        let password = self
            .password_hash
            .map(UserPassword::from_phc_string)
            .transpose()?;

        Ok(User {
            id: UserId::from_uuid(self.id),
            email: Email::from_db(self.email),
            password,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            avatar: self.avatar,
            role,
            is_verified: self.is_verified,
            is_active: self.is_active,
            language: Language::from_code(&self.language).unwrap_or_default(),
            oauth_provider: self.oauth_provider,
            oauth_subject: self.oauth_subject,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    user_id: Uuid,
    business_name: Option<String>,
    description: Json<LocalizedText>,
    address: Option<String>,
    city: Option<String>,
    website: Option<String>,
    experience_years: Option<i32>,
    service_radius_km: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_profile(self) -> ProviderProfile {
        ProviderProfile {
            user_id: UserId::from_uuid(self.user_id),
            business_name: self.business_name,
            description: self.description.0,
            address: self.address,
            city: self.city,
            website: self.website,
            experience_years: self.experience_years,
            service_radius_km: self.service_radius_km,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProviderRow {
    #[sqlx(flatten)]
    user: UserRow,
    p_business_name: Option<String>,
    p_description: Json<LocalizedText>,
    p_address: Option<String>,
    p_city: Option<String>,
    p_website: Option<String>,
    p_experience_years: Option<i32>,
    p_service_radius_km: Option<i32>,
    p_created_at: DateTime<Utc>,
    p_updated_at: DateTime<Utc>,
}

impl ProviderRow {
    fn into_pair(self) -> AuthResult<(User, ProviderProfile)> {
        let user = self.user.into_user()?;
        let profile = ProviderProfile {
            user_id: user.id,
            business_name: self.p_business_name,
            description: self.p_description.0,
            address: self.p_address,
            city: self.p_city,
            website: self.p_website,
            experience_years: self.p_experience_years,
            service_radius_km: self.p_service_radius_km,
            created_at: self.p_created_at,
            updated_at: self.p_updated_at,
        };
        Ok((user, profile))
    }
}
