//! Fixed demonstration data.

use crate::db::schema::TABLES;
use crate::error::{Error, Result};
use rusqlite::{params, Transaction};

/// Seeded accounts as (login, plaintext password, admin). Passwords are
/// hashed by the caller before they reach the database.
pub const SEED_USERS: [(&str, &str, bool); 4] = [
    ("user001", "123456", false),
    ("user002", "123456", false),
    ("user003", "123456", true),
    ("user004", "123456", true),
];

/// Rows seeded per table.
pub const SEED_COUNTS: [(&str, i64); 7] = [
    ("users", 4),
    ("scientist", 4),
    ("status", 5),
    ("transport", 5),
    ("geographical_object", 5),
    ("mars_station", 5),
    ("location", 5),
];

const SEED_SQL: &str = r#"
INSERT INTO scientist (full_name, post, name_organization, address, id_user) VALUES
    ('John Grotzinger', 'Professor of geology, chief scientist of the Curiosity rover mission', 'California Institute of Technology (Caltech)', '', 1),
    ('Sergei Pavlovich Korolev', 'Head', 'Main Directorate for Rocket Engineering (GURRD)', '', 2),
    ('James M. Beggs', 'NASA Administrator', 'NASA', '', 3),
    ('Georgy Timofeyevich Beregovoy', 'Chief', 'Interplanetary department of the Central Research Institute of Machine Building (TsNIIMash)', '', 4);

INSERT INTO geographical_object (feature, type, size, describe, url_photo, status) VALUES
    ('Acidalia Planitia', 'Planitia, planitiae', 2300,
     'Vast dark plain between the Tharsis volcanic region and Arabia Terra, northeast of Valles Marineris. Centred near 50N 339E, about 3000 km across.',
     'http://themis.asu.edu/files/feature_thumbnails/002acidaliaTN1.jpg',
     TRUE),
    ('Alba Patera', 'Patera, paterae', 530,
     'Huge low volcano in the northern Tharsis region, the largest Martian volcano by area; its flows reach at least 1350 km from the summit.',
     'https://upload.wikimedia.org/wikipedia/commons/thumb/2/22/Tharsis_-_Valles_Marineris_MOLA_shaded_colorized_zoom_32.jpg/1280px-Tharsis_-_Valles_Marineris_MOLA_shaded_colorized_zoom_32.jpg',
     TRUE),
    ('Albor Tholus', 'Tholus, tholi', 170,
     'Extinct volcano of the Elysium rise, south of Elysium Mons and Hecates Tholus. 4.5 km high and 160 km across at the base.',
     'https://upload.wikimedia.org/wikipedia/commons/thumb/0/07/Albor_Tholus_THEMIS.jpg/800px-Albor_Tholus_THEMIS.jpg',
     TRUE),
    ('Amazonis Planitia', 'Planitia, planitiae', 2800,
     'Smooth plain in the northern equatorial region. Young surface, 10 to 100 million years old, partly solidified lava.',
     'https://upload.wikimedia.org/wikipedia/commons/3/31/26552sharpridges.jpg',
     TRUE),
    ('Arabia Terra', 'Terra, terrae', 5100,
     'Large upland region in the north, mostly in the Arabia quadrangle. Heavily cratered and strongly eroded.',
     'https://upload.wikimedia.org/wikipedia/commons/thumb/4/41/Eden_Patera_THEMIS_day_IR.jpg/1189px-Eden_Patera_THEMIS_day_IR.jpg',
     TRUE);

INSERT INTO transport (name, type, describe, url_photo) VALUES
    ('Mars Pathfinder Rover (USA)', 'Rover', '', 'https://slideplayer.biz.tr/slide/5582070/17/images/5/Pathfinder+%28İzci%29+uzay+aracı.jpg'),
    ('Viking 1 Lander (USA)', 'Spacecraft', '', 'https://upload.wikimedia.org/wikipedia/commons/thumb/7/75/Viking_spacecraft.jpg/1304px-Viking_spacecraft.jpg'),
    ('Viking 2 Lander (USA)', 'Spacecraft', '', 'https://upload.wikimedia.org/wikipedia/commons/thumb/7/75/Viking_spacecraft.jpg/1304px-Viking_spacecraft.jpg'),
    ('Mars 6 Lander (USSR)', 'Spacecraft', '', 'https://upload.wikimedia.org/wikipedia/commons/9/90/Mars_6.jpg'),
    ('Mars 2 Lander (USSR)', 'Spacecraft', '', 'https://upload.wikimedia.org/wikipedia/commons/1/13/Mars3_iki.jpg');

INSERT INTO status (status_task, status_mission) VALUES
    ('entered', 'success'),
    ('in_operation', 'running'),
    ('completed', 'success'),
    ('canceled', 'loss'),
    ('deleted', 'success');

INSERT INTO mars_station (type_status, data_create, data_from, data_close, id_scientist, id_transport, id_status) VALUES
    ('research', '1972-09-01', '1973-11-04', '1975-05-08', 1, 1, 1),
    ('commercial', '1975-05-08', '1976-11-07', '1977-11-01', 2, 2, 2),
    ('commercial', '1982-07-15', '1983-07-11', '1984-01-06', 3, 3, 3),
    ('research', '1968-06-17', '1969-04-09', '1970-03-03', 1, 4, 4),
    ('research', '1988-03-18', '1989-05-05', '1990-05-07', 4, 5, 5);

INSERT INTO location (id_geographical_object, id_mars_station, purpose, results) VALUES
    (1, 1, 'Survey of the northern lowland plains', 'Dust and soil samples analysed'),
    (2, 2, 'Volcanic flow mapping', 'Flow boundaries charted'),
    (3, 3, 'Caldera imaging', 'Summit imaged in visible and infrared'),
    (4, 4, 'Lava plain sampling', NULL),
    (5, 5, 'Crater density survey', 'Crater counts recorded');
"#;

/// Insert every seed row inside the caller's transaction.
///
/// `users` carries (login, password hash, admin) in the order of
/// [`SEED_USERS`]; the remaining rows reference them by id, so every table
/// must be empty. Returns [`Error::NotEmpty`] otherwise.
pub fn insert_seed(tx: &Transaction<'_>, users: &[(&str, String, bool)]) -> Result<()> {
    for table in TABLES {
        let populated: bool =
            tx.query_row(&format!("SELECT EXISTS(SELECT 1 FROM {table})"), [], |row| {
                row.get(0)
            })?;
        if populated {
            return Err(Error::NotEmpty(table));
        }
    }

    {
        let mut stmt =
            tx.prepare("INSERT INTO users (login, password, admin) VALUES (?1, ?2, ?3)")?;
        for (login, hash, admin) in users {
            stmt.execute(params![login, hash, admin])?;
        }
    }
    tx.execute_batch(SEED_SQL)?;
    Ok(())
}
