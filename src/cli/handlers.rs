use crate::cli::output;
use crate::core::{
    Gateway, MissionStatus, NewGeographicalObject, NewLocation, NewMarsStation, NewTransport,
    TaskStatus,
};
use crate::db::Schema;
use crate::error::{Error, Result};

fn check_initialized(gateway: &Gateway) -> Result<()> {
    if !gateway.is_initialized()? {
        return Err(Error::NotInitialized);
    }
    Ok(())
}

/// Handle the init command
pub fn handle_init(gateway: &mut Gateway) -> Result<()> {
    gateway.create_schema()?;
    println!("Created schema in {}", gateway.path());
    Ok(())
}

/// Handle the drop command
pub fn handle_drop(gateway: &mut Gateway) -> Result<()> {
    gateway.drop_schema()?;
    println!("Dropped all tables");
    Ok(())
}

/// Handle the seed command
pub fn handle_seed(gateway: &mut Gateway) -> Result<()> {
    check_initialized(gateway)?;
    gateway.seed()?;
    println!("Inserted demonstration data");
    Ok(())
}

/// Handle the reset command
pub fn handle_reset(gateway: &mut Gateway) -> Result<()> {
    gateway.reset()?;
    println!("Recreated schema and inserted demonstration data");
    Ok(())
}

/// Handle the dump command
pub fn handle_dump(gateway: &mut Gateway, table: Option<&str>, json: bool) -> Result<()> {
    check_initialized(gateway)?;
    let snapshot = gateway.select_all()?;

    if let Some(name) = table {
        let name = Schema::table(name)?;
        let dump = snapshot
            .get(name)
            .ok_or_else(|| Error::UnknownTable(name.to_string()))?;
        if json {
            output::print_json(&dump.to_json())?;
        } else {
            print!("{}", output::render_table(name, dump));
        }
        return Ok(());
    }

    if json {
        output::print_json(&snapshot.to_json())?;
    } else {
        for table in output::render_snapshot(&snapshot) {
            println!("{table}");
        }
    }
    Ok(())
}

/// Handle the objects command
pub fn handle_objects(gateway: &mut Gateway, json: bool) -> Result<()> {
    check_initialized(gateway)?;
    let objects = gateway.get_geographical_objects_with_status_true()?;

    if json {
        return output::print_json(&objects);
    }
    if objects.is_empty() {
        println!("No available geographical objects");
    }
    for object in &objects {
        println!("{}", output::format_object(object));
    }
    Ok(())
}

/// Handle the locations command
pub fn handle_locations(gateway: &mut Gateway, object: Option<i64>, json: bool) -> Result<()> {
    check_initialized(gateway)?;

    match object {
        Some(id) => {
            let rows = gateway.get_locations_by_id(id)?;
            if json {
                return output::print_json(&rows);
            }
            if rows.is_empty() {
                println!("No locations for geographical object #{id}");
            }
            for row in &rows {
                println!("{}", output::format_location_detail(row));
            }
        }
        None => {
            let rows = gateway.get_locations()?;
            if json {
                return output::print_json(&rows);
            }
            for row in &rows {
                println!("{}", output::format_location(row));
            }
        }
    }
    Ok(())
}

/// Handle the transports command
pub fn handle_transports(gateway: &mut Gateway, json: bool) -> Result<()> {
    check_initialized(gateway)?;
    let transports = gateway.get_transports()?;

    if json {
        return output::print_json(&transports);
    }
    for transport in &transports {
        println!("[#{}] {} ({})", transport.id, transport.name, transport.kind);
    }
    Ok(())
}

/// Handle the stations command
pub fn handle_stations(gateway: &mut Gateway, json: bool) -> Result<()> {
    check_initialized(gateway)?;
    let stations = gateway.get_mars_stations()?;

    if json {
        return output::print_json(&stations);
    }
    for station in &stations {
        println!(
            "[#{}] {} {} .. {} (created {}) scientist #{} transport #{} status #{}",
            station.id,
            station.type_status,
            station.data_from,
            station.data_close,
            station.data_create,
            station.id_scientist,
            station.id_transport,
            station.id_status,
        );
    }
    Ok(())
}

/// Handle the add-object command
pub fn handle_add_object(gateway: &mut Gateway, object: NewGeographicalObject) -> Result<()> {
    check_initialized(gateway)?;
    let id = gateway.insert_geographical_object(&object)?;
    println!("Created geographical object #{id}: {}", object.feature);
    Ok(())
}

/// Handle the add-transport command
pub fn handle_add_transport(gateway: &mut Gateway, transport: NewTransport) -> Result<()> {
    check_initialized(gateway)?;
    let id = gateway.insert_transport(&transport)?;
    println!("Created transport #{id}: {}", transport.name);
    Ok(())
}

/// Handle the add-station command
pub fn handle_add_station(gateway: &mut Gateway, station: NewMarsStation) -> Result<()> {
    check_initialized(gateway)?;
    let id = gateway.insert_mars_station(&station)?;
    println!("Created mars station #{id}");
    Ok(())
}

/// Handle the add-location command
pub fn handle_add_location(gateway: &mut Gateway, location: NewLocation) -> Result<()> {
    check_initialized(gateway)?;
    let id = gateway.insert_location(&location)?;
    println!(
        "Created location #{id}: object #{} at station #{}",
        location.id_geographical_object, location.id_mars_station
    );
    Ok(())
}

/// Handle the set-availability command
pub fn handle_set_availability(gateway: &mut Gateway, id: i64, available: bool) -> Result<()> {
    check_initialized(gateway)?;
    gateway.update_status_delete_geographical_object(id, available)?;
    let state = if available { "available" } else { "unavailable" };
    println!("Geographical object #{id} is now {state}");
    Ok(())
}

/// Handle the set-status command
pub fn handle_set_status(
    gateway: &mut Gateway,
    id: i64,
    task: TaskStatus,
    mission: MissionStatus,
) -> Result<()> {
    check_initialized(gateway)?;
    gateway.update_status(id, task, mission)?;
    let status = gateway.get_status(id)?;
    println!(
        "Status #{}: task {}, mission {}",
        status.id, status.status_task, status.status_mission
    );
    Ok(())
}

/// Handle the login command
pub fn handle_login(gateway: &mut Gateway, login: &str, password: &str) -> Result<()> {
    check_initialized(gateway)?;
    match gateway.authenticate(login, password)? {
        Some(user) => {
            let role = if user.admin { "admin" } else { "user" };
            println!("Logged in as {} ({role})", user.login);
            Ok(())
        }
        None => Err(Error::InvalidCredentials),
    }
}
