//! Data access gateway - every mission database operation in one place.
//!
//! Each write runs in its own transaction. A failing statement returns
//! early, the transaction is dropped uncommitted and SQLite rolls it back.

use crate::core::models::{
    GeographicalObject, LocationDetail, LocationSummary, MarsStation, MissionStatus,
    NewGeographicalObject, NewLocation, NewMarsStation, NewScientist, NewStatus, NewTransport,
    NewUser, Status, TaskStatus, Transport, User,
};
use crate::core::password::{self, Argon2Params};
use crate::db::schema::{Schema, Snapshot, TABLES};
use crate::db::seed::{self, SEED_USERS};
use crate::db::{Connection, DbPath};
use crate::error::{Error, Result};
use rusqlite::{params, OptionalExtension};
use tracing::{info, instrument};

const LOCATION_JOIN: &str = "
    SELECT
        l.id AS l_id,
        g.feature AS go_feature,
        g.type AS go_type,
        t.name AS t_name,
        t.type AS t_type,
        t.url_photo AS t_url_photo,
        l.purpose AS l_purpose,
        l.results AS l_results,
        s.status_mission AS status_mission,
        s.status_task AS status_task
    FROM location AS l
    INNER JOIN geographical_object AS g ON l.id_geographical_object = g.id
    INNER JOIN mars_station AS ms ON l.id_mars_station = ms.id
    INNER JOIN transport AS t ON ms.id_transport = t.id
    INNER JOIN status AS s ON ms.id_status = s.id";

/// Owns the database connection and exposes schema, seed and CRUD operations.
pub struct Gateway {
    conn: Connection,
    path: DbPath,
    argon2: Argon2Params,
}

impl Gateway {
    /// Open the database and enable foreign key enforcement.
    #[instrument(skip(argon2), fields(db = %path), err)]
    pub fn connect(path: &DbPath, argon2: Argon2Params) -> Result<Self> {
        let conn = Connection::open(path)?;
        info!("connected to mission database");
        Ok(Self {
            conn,
            path: path.clone(),
            argon2,
        })
    }

    /// Open a private in-memory gateway with cheap password hashing.
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::connect(&DbPath::memory(), Argon2Params::fast())
    }

    /// Where this gateway's database lives.
    pub fn path(&self) -> &DbPath {
        &self.path
    }

    /// Whether the schema has been created.
    pub fn is_initialized(&self) -> Result<bool> {
        Schema::is_initialized(&self.conn)
    }

    // ==================== Schema ====================

    /// Create every table and index. Fails if the schema already exists.
    #[instrument(skip(self), err)]
    pub fn create_schema(&mut self) -> Result<()> {
        Schema::create(&mut self.conn)?;
        info!(tables = TABLES.len(), "schema created");
        Ok(())
    }

    /// Drop every table. Missing tables are skipped.
    #[instrument(skip(self), err)]
    pub fn drop_schema(&mut self) -> Result<()> {
        Schema::drop(&mut self.conn)?;
        info!("schema dropped");
        Ok(())
    }

    /// Insert the fixed demonstration rows in a single transaction.
    ///
    /// Every table must be empty; see [`Gateway::reset`] for a populated
    /// database.
    #[instrument(skip(self), err)]
    pub fn seed(&mut self) -> Result<()> {
        let users = self.hash_seed_users()?;

        let tx = self.conn.transaction()?;
        seed::insert_seed(&tx, &users)?;
        tx.commit()?;
        info!("seed data inserted");
        Ok(())
    }

    /// Drop, recreate and seed the schema as one transaction.
    ///
    /// On any failure the previous tables and rows are left untouched.
    #[instrument(skip(self), err)]
    pub fn reset(&mut self) -> Result<()> {
        let users = self.hash_seed_users()?;

        let tx = self.conn.transaction()?;
        Schema::drop_tables(&tx)?;
        Schema::create_tables(&tx)?;
        seed::insert_seed(&tx, &users)?;
        tx.commit()?;
        info!("schema reset with seed data");
        Ok(())
    }

    fn hash_seed_users(&self) -> Result<Vec<(&'static str, String, bool)>> {
        let mut users = Vec::with_capacity(SEED_USERS.len());
        for (login, pw, admin) in SEED_USERS {
            users.push((login, password::hash_password(pw, self.argon2)?, admin));
        }
        Ok(users)
    }

    // ==================== Inserts ====================

    fn insert<P: rusqlite::Params>(&mut self, sql: &str, params: P) -> Result<i64> {
        let tx = self.conn.transaction()?;
        tx.execute(sql, params)?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(id)
    }

    /// Insert a geographical object and return its id.
    #[instrument(skip(self, object), fields(feature = %object.feature), err)]
    pub fn insert_geographical_object(&mut self, object: &NewGeographicalObject) -> Result<i64> {
        let id = self.insert(
            "INSERT INTO geographical_object (type, feature, size, describe, url_photo, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                object.kind,
                object.feature,
                object.size,
                object.describe,
                object.url_photo,
                object.status
            ],
        )?;
        info!(id, "geographical object inserted");
        Ok(id)
    }

    /// Insert a transport and return its id.
    #[instrument(skip(self, transport), fields(name = %transport.name), err)]
    pub fn insert_transport(&mut self, transport: &NewTransport) -> Result<i64> {
        let id = self.insert(
            "INSERT INTO transport (name, type, describe, url_photo) VALUES (?1, ?2, ?3, ?4)",
            params![
                transport.name,
                transport.kind,
                transport.describe,
                transport.url_photo
            ],
        )?;
        info!(id, "transport inserted");
        Ok(id)
    }

    /// Insert a station. Its scientist, transport and status must exist.
    #[instrument(skip(self, station), fields(type_status = %station.type_status), err)]
    pub fn insert_mars_station(&mut self, station: &NewMarsStation) -> Result<i64> {
        let id = self.insert(
            "INSERT INTO mars_station
                (type_status, data_create, data_from, data_close, id_scientist, id_transport, id_status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                station.type_status,
                station.data_create,
                station.data_from,
                station.data_close,
                station.id_scientist,
                station.id_transport,
                station.id_status
            ],
        )?;
        info!(id, "mars station inserted");
        Ok(id)
    }

    /// Link a geographical object to a station and return the location id.
    #[instrument(
        skip(self, location),
        fields(
            id_geographical_object = location.id_geographical_object,
            id_mars_station = location.id_mars_station
        ),
        err
    )]
    pub fn insert_location(&mut self, location: &NewLocation) -> Result<i64> {
        let id = self.insert(
            "INSERT INTO location (id_geographical_object, id_mars_station, purpose, results)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                location.id_geographical_object,
                location.id_mars_station,
                location.purpose,
                location.results
            ],
        )?;
        info!(id, "location inserted");
        Ok(id)
    }

    /// Insert a task/mission status pair and return its id.
    #[instrument(skip(self), err)]
    pub fn insert_status(&mut self, status: NewStatus) -> Result<i64> {
        let id = self.insert(
            "INSERT INTO status (status_task, status_mission) VALUES (?1, ?2)",
            params![status.status_task, status.status_mission],
        )?;
        info!(id, "status inserted");
        Ok(id)
    }

    /// Insert a scientist attached to an existing user.
    #[instrument(skip(self, scientist), fields(full_name = %scientist.full_name), err)]
    pub fn insert_scientist(&mut self, scientist: &NewScientist) -> Result<i64> {
        let id = self.insert(
            "INSERT INTO scientist (full_name, post, name_organization, address, id_user)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                scientist.full_name,
                scientist.post,
                scientist.name_organization,
                scientist.address,
                scientist.id_user
            ],
        )?;
        info!(id, "scientist inserted");
        Ok(id)
    }

    /// Hash the password and insert a user. Logins are unique.
    #[instrument(skip(self, user), fields(login = %user.login), err)]
    pub fn insert_user(&mut self, user: &NewUser) -> Result<i64> {
        let hash = password::hash_password(&user.password, self.argon2)?;
        let id = self.insert(
            "INSERT INTO users (login, password, admin) VALUES (?1, ?2, ?3)",
            params![user.login, hash, user.admin],
        )?;
        info!(id, "user inserted");
        Ok(id)
    }

    // ==================== Updates ====================

    fn update<P: rusqlite::Params>(
        &mut self,
        entity: &'static str,
        id: i64,
        sql: &str,
        params: P,
    ) -> Result<()> {
        let tx = self.conn.transaction()?;
        let changed = tx.execute(sql, params)?;
        if changed == 0 {
            return Err(Error::NotFound { entity, id });
        }
        tx.commit()?;
        Ok(())
    }

    /// Set the availability flag of a geographical object.
    #[instrument(skip(self), err)]
    pub fn update_status_delete_geographical_object(&mut self, id: i64, available: bool) -> Result<()> {
        self.update(
            "geographical_object",
            id,
            "UPDATE geographical_object SET status = ?1 WHERE id = ?2",
            params![available, id],
        )?;
        info!("availability updated");
        Ok(())
    }

    /// Set the task and mission labels of a status row.
    #[instrument(skip(self), err)]
    pub fn update_status(
        &mut self,
        id: i64,
        status_task: TaskStatus,
        status_mission: MissionStatus,
    ) -> Result<()> {
        self.update(
            "status",
            id,
            "UPDATE status SET status_task = ?1, status_mission = ?2 WHERE id = ?3",
            params![status_task, status_mission, id],
        )?;
        info!("status updated");
        Ok(())
    }

    // ==================== Reads ====================

    /// Every row and column name of every table.
    #[instrument(skip(self), err)]
    pub fn select_all(&self) -> Result<Snapshot> {
        let mut snapshot = Snapshot::default();
        for table in TABLES {
            snapshot
                .tables
                .insert(table.to_string(), Schema::dump_table(&self.conn, table)?);
        }
        info!("all tables read");
        Ok(snapshot)
    }

    /// Row count of one schema table.
    pub fn count_rows(&self, table: &str) -> Result<i64> {
        Schema::count_rows(&self.conn, table)
    }

    /// Geographical objects currently marked available.
    #[instrument(skip(self), err)]
    pub fn get_geographical_objects_with_status_true(&self) -> Result<Vec<GeographicalObject>> {
        let objects = self.conn.query(
            "SELECT * FROM geographical_object WHERE status = TRUE ORDER BY id",
            [],
            GeographicalObject::from_row,
        )?;
        info!(count = objects.len(), "available geographical objects read");
        Ok(objects)
    }

    /// Every location joined with its object, station transport and status.
    #[instrument(skip(self), err)]
    pub fn get_locations(&self) -> Result<Vec<LocationSummary>> {
        let rows = self.conn.query(
            &format!("{LOCATION_JOIN} ORDER BY l.id"),
            [],
            LocationSummary::from_row,
        )?;
        info!(count = rows.len(), "locations read");
        Ok(rows)
    }

    /// Locations of one geographical object, including the transport photo.
    #[instrument(skip(self), err)]
    pub fn get_locations_by_id(&self, id_geographical_object: i64) -> Result<Vec<LocationDetail>> {
        let rows = self.conn.query(
            &format!("{LOCATION_JOIN} WHERE g.id = ?1 ORDER BY l.id"),
            [id_geographical_object],
            LocationDetail::from_row,
        )?;
        info!(count = rows.len(), "locations read");
        Ok(rows)
    }

    /// Every transport ordered by id.
    #[instrument(skip(self), err)]
    pub fn get_transports(&self) -> Result<Vec<Transport>> {
        self.conn
            .query("SELECT * FROM transport ORDER BY id", [], Transport::from_row)
    }

    /// Every station ordered by id.
    #[instrument(skip(self), err)]
    pub fn get_mars_stations(&self) -> Result<Vec<MarsStation>> {
        self.conn.query(
            "SELECT * FROM mars_station ORDER BY id",
            [],
            MarsStation::from_row,
        )
    }

    /// One status row by id.
    #[instrument(skip(self), err)]
    pub fn get_status(&self, id: i64) -> Result<Status> {
        self.conn
            .as_conn()
            .query_row("SELECT * FROM status WHERE id = ?1", [id], Status::from_row)
            .optional()?
            .ok_or(Error::NotFound {
                entity: "status",
                id,
            })
    }

    /// Check credentials. Returns the user when login and password match.
    #[instrument(skip(self, password), err)]
    pub fn authenticate(&self, login: &str, password: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .as_conn()
            .query_row(
                "SELECT * FROM users WHERE login = ?1",
                [login],
                User::from_row,
            )
            .optional()?;

        match user {
            Some(user) if password::verify_password(password, &user.password_hash)? => {
                info!(id = user.id, "login accepted");
                Ok(Some(user))
            }
            _ => {
                info!("login rejected");
                Ok(None)
            }
        }
    }

    /// Release the connection.
    #[instrument(skip(self), fields(db = %self.path), err)]
    pub fn close(self) -> Result<()> {
        self.conn.close()?;
        info!("connection closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::seed::SEED_COUNTS;
    use chrono::NaiveDate;

    fn setup_gateway() -> Gateway {
        let mut gateway = Gateway::open_in_memory().unwrap();
        gateway.create_schema().unwrap();
        gateway
    }

    fn seeded_gateway() -> Gateway {
        let mut gateway = setup_gateway();
        gateway.seed().unwrap();
        gateway
    }

    fn new_object(feature: &str, status: bool) -> NewGeographicalObject {
        NewGeographicalObject {
            kind: "Crater, craters".to_string(),
            feature: feature.to_string(),
            size: Some(154),
            describe: Some("Impact crater".to_string()),
            url_photo: None,
            status,
        }
    }

    fn counts(gateway: &Gateway) -> Vec<i64> {
        TABLES
            .iter()
            .map(|t| gateway.count_rows(t).unwrap())
            .collect()
    }

    #[test]
    fn test_seed_row_counts() {
        let gateway = seeded_gateway();
        let snapshot = gateway.select_all().unwrap();

        for (table, expected) in SEED_COUNTS {
            assert_eq!(snapshot.row_count(table) as i64, expected, "{table}");
        }
        assert_eq!(snapshot.tables.len(), TABLES.len());
    }

    #[test]
    fn test_seed_foreign_keys_resolve() {
        let gateway = seeded_gateway();
        let violations: Vec<String> = gateway
            .conn
            .query("SELECT \"table\" FROM pragma_foreign_key_check", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn test_seed_hashes_passwords() {
        let gateway = seeded_gateway();
        let dump = gateway.select_all().unwrap();
        let users = dump.get("users").unwrap();
        let password_col = users.columns.iter().position(|c| c == "password").unwrap();

        for row in &users.rows {
            let stored = crate::db::schema::value_to_string(&row[password_col]);
            assert_ne!(stored, "123456");
            assert!(stored.starts_with("$argon2id$"));
        }
    }

    #[test]
    fn test_seed_twice_rolls_back_second_run() {
        let mut gateway = seeded_gateway();
        let before = counts(&gateway);

        assert!(matches!(gateway.seed().unwrap_err(), Error::NotEmpty("users")));
        assert_eq!(counts(&gateway), before);
    }

    #[test]
    fn test_seed_after_insert_is_rejected() {
        let mut gateway = setup_gateway();
        gateway
            .insert_transport(&NewTransport {
                name: "Perseverance (USA)".to_string(),
                kind: "Rover".to_string(),
                describe: None,
                url_photo: None,
            })
            .unwrap();

        let err = gateway.seed().unwrap_err();
        assert!(matches!(err, Error::NotEmpty("transport")));
        assert_eq!(gateway.count_rows("transport").unwrap(), 1);
        assert_eq!(gateway.count_rows("location").unwrap(), 0);
        assert!(gateway.get_locations().unwrap().is_empty());
    }

    #[test]
    fn test_reset_replaces_existing_rows() {
        let mut gateway = seeded_gateway();
        gateway
            .insert_geographical_object(&new_object("Gale", true))
            .unwrap();

        gateway.reset().unwrap();

        for (table, expected) in SEED_COUNTS {
            assert_eq!(gateway.count_rows(table).unwrap(), expected, "{table}");
        }
        let locations = gateway.get_locations().unwrap();
        assert_eq!(locations[0].transport_name, "Mars Pathfinder Rover (USA)");
    }

    #[test]
    fn test_reset_on_fresh_database() {
        let mut gateway = Gateway::open_in_memory().unwrap();
        gateway.reset().unwrap();
        assert!(gateway.is_initialized().unwrap());
        assert_eq!(gateway.count_rows("users").unwrap(), 4);
    }

    #[test]
    fn test_failed_reset_keeps_previous_rows() {
        let mut gateway = seeded_gateway();
        gateway
            .insert_geographical_object(&new_object("Gale", true))
            .unwrap();
        let before = counts(&gateway);

        gateway.argon2 = Argon2Params {
            iterations: 0,
            ..Argon2Params::fast()
        };
        assert!(matches!(
            gateway.reset().unwrap_err(),
            Error::PasswordHash(_)
        ));

        assert!(gateway.is_initialized().unwrap());
        assert_eq!(counts(&gateway), before);
    }

    #[test]
    fn test_available_objects_excludes_unavailable_insert() {
        let mut gateway = seeded_gateway();
        let hidden = gateway
            .insert_geographical_object(&new_object("Gale", false))
            .unwrap();

        let available = gateway.get_geographical_objects_with_status_true().unwrap();
        assert_eq!(available.len(), 5);
        assert!(available.iter().all(|o| o.status));
        assert!(available.iter().all(|o| o.id != hidden));
    }

    #[test]
    fn test_inserted_object_reads_back_through_location() {
        let mut gateway = seeded_gateway();
        let object_id = gateway
            .insert_geographical_object(&new_object("Jezero", true))
            .unwrap();
        gateway
            .insert_location(&NewLocation {
                id_geographical_object: object_id,
                id_mars_station: 2,
                purpose: Some("Delta sampling".to_string()),
                results: None,
            })
            .unwrap();

        let rows = gateway.get_locations_by_id(object_id).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].go_feature, "Jezero");
        assert_eq!(rows[0].go_type, "Crater, craters");
        assert_eq!(rows[0].t_name, "Viking 1 Lander (USA)");
        assert_eq!(rows[0].l_purpose.as_deref(), Some("Delta sampling"));
        assert_eq!(rows[0].status_mission, MissionStatus::Running);
        assert_eq!(rows[0].status_task, TaskStatus::InOperation);
    }

    #[test]
    fn test_get_locations_joins_every_seed_row() {
        let gateway = seeded_gateway();
        let rows = gateway.get_locations().unwrap();

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].feature, "Acidalia Planitia");
        assert_eq!(rows[0].transport_name, "Mars Pathfinder Rover (USA)");
        assert_eq!(rows[3].status_mission, MissionStatus::Loss);
        assert_eq!(rows[3].results, None);
    }

    #[test]
    fn test_get_locations_by_id_unknown_object_is_empty() {
        let gateway = seeded_gateway();
        assert!(gateway.get_locations_by_id(999).unwrap().is_empty());
    }

    #[test]
    fn test_availability_update_is_reflected() {
        let mut gateway = seeded_gateway();
        gateway
            .update_status_delete_geographical_object(3, false)
            .unwrap();

        let available = gateway.get_geographical_objects_with_status_true().unwrap();
        assert_eq!(available.len(), 4);
        assert!(available.iter().all(|o| o.id != 3));

        gateway
            .update_status_delete_geographical_object(3, true)
            .unwrap();
        assert_eq!(
            gateway
                .get_geographical_objects_with_status_true()
                .unwrap()
                .len(),
            5
        );
    }

    #[test]
    fn test_update_missing_row_is_not_found() {
        let mut gateway = seeded_gateway();
        assert!(matches!(
            gateway.update_status_delete_geographical_object(42, false),
            Err(Error::NotFound {
                entity: "geographical_object",
                id: 42
            })
        ));
        assert!(matches!(
            gateway.update_status(42, TaskStatus::Completed, MissionStatus::Success),
            Err(Error::NotFound { entity: "status", .. })
        ));
    }

    #[test]
    fn test_update_status_labels() {
        let mut gateway = seeded_gateway();
        gateway
            .update_status(2, TaskStatus::Completed, MissionStatus::Success)
            .unwrap();

        let status = gateway.get_status(2).unwrap();
        assert_eq!(status.status_task, TaskStatus::Completed);
        assert_eq!(status.status_mission, MissionStatus::Success);
    }

    #[test]
    fn test_drop_and_recreate_is_empty() {
        let mut gateway = seeded_gateway();
        gateway.drop_schema().unwrap();
        assert!(!gateway.is_initialized().unwrap());

        gateway.create_schema().unwrap();
        assert!(counts(&gateway).iter().all(|&c| c == 0));
    }

    #[test]
    fn test_failed_insert_leaves_counts_unchanged() {
        let mut gateway = seeded_gateway();
        let before = counts(&gateway);

        let err = gateway
            .insert_location(&NewLocation {
                id_geographical_object: 1,
                id_mars_station: 999,
                purpose: None,
                results: None,
            })
            .unwrap_err();
        assert!(err.is_constraint_violation());
        assert_eq!(counts(&gateway), before);

        // The gateway keeps serving calls after a failure.
        assert_eq!(gateway.get_locations().unwrap().len(), 5);
    }

    #[test]
    fn test_insert_station_chain() {
        let mut gateway = setup_gateway();
        let user = gateway
            .insert_user(&NewUser {
                login: "curiosity".to_string(),
                password: "gale-crater".to_string(),
                admin: true,
            })
            .unwrap();
        let scientist = gateway
            .insert_scientist(&NewScientist {
                full_name: "Ashwin Vasavada".to_string(),
                post: "Project scientist".to_string(),
                name_organization: "JPL".to_string(),
                address: None,
                id_user: user,
            })
            .unwrap();
        let transport = gateway
            .insert_transport(&NewTransport {
                name: "Curiosity (USA)".to_string(),
                kind: "Rover".to_string(),
                describe: None,
                url_photo: None,
            })
            .unwrap();
        let status = gateway
            .insert_status(NewStatus {
                status_task: TaskStatus::InOperation,
                status_mission: MissionStatus::Running,
            })
            .unwrap();
        let station = gateway
            .insert_mars_station(&NewMarsStation {
                type_status: "research".to_string(),
                data_create: NaiveDate::from_ymd_opt(2011, 11, 26).unwrap(),
                data_from: NaiveDate::from_ymd_opt(2012, 8, 6).unwrap(),
                data_close: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
                id_scientist: scientist,
                id_transport: transport,
                id_status: status,
            })
            .unwrap();

        let stations = gateway.get_mars_stations().unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id, station);
        assert_eq!(
            stations[0].data_from,
            NaiveDate::from_ymd_opt(2012, 8, 6).unwrap()
        );
        assert_eq!(gateway.get_transports().unwrap()[0].kind, "Rover");
    }

    #[test]
    fn test_station_with_missing_scientist_rejected() {
        let mut gateway = seeded_gateway();
        let date = NaiveDate::from_ymd_opt(1997, 7, 4).unwrap();
        let err = gateway
            .insert_mars_station(&NewMarsStation {
                type_status: "research".to_string(),
                data_create: date,
                data_from: date,
                data_close: date,
                id_scientist: 77,
                id_transport: 1,
                id_status: 1,
            })
            .unwrap_err();
        assert!(err.is_constraint_violation());
        assert_eq!(gateway.count_rows("mars_station").unwrap(), 5);
    }

    #[test]
    fn test_authenticate() {
        let gateway = seeded_gateway();

        let user = gateway.authenticate("user003", "123456").unwrap().unwrap();
        assert!(user.admin);
        assert!(gateway.authenticate("user003", "wrong").unwrap().is_none());
        assert!(gateway.authenticate("nobody", "123456").unwrap().is_none());
    }

    #[test]
    fn test_close() {
        let gateway = seeded_gateway();
        gateway.close().unwrap();
    }
}
