use crate::api::{NewProgram, NewTrade};
use crate::storage::repository::{
    DepartmentRecord, DepartmentRepository, ProgramRepository, TradeRepository,
};
use log::info;
use sea_orm::DatabaseConnection;

struct SeedDepartment {
    name: &'static str,
    code: &'static str,
    description: &'static str,
    /// None 表示 program 下的直属部门
    trade_code: Option<&'static str>,
}

const UG_TRADES: &[(&str, &str)] = &[("B.Tech", "BTECH"), ("B.Arch", "BARCH")];
const PG_TRADES: &[(&str, &str)] = &[("M.Tech", "MTECH")];

const UG_DEPARTMENTS: &[SeedDepartment] = &[
    SeedDepartment {
        name: "Computer Science & Engineering",
        code: "CSE",
        description: "Leading department in software and computer systems",
        trade_code: Some("BTECH"),
    },
    SeedDepartment {
        name: "Mechanical Engineering",
        code: "MECHANICAL",
        description: "Engineering mechanics and manufacturing",
        trade_code: Some("BTECH"),
    },
    SeedDepartment {
        name: "Civil Engineering",
        code: "CIVIL",
        description: "Infrastructure and construction engineering",
        trade_code: Some("BTECH"),
    },
    SeedDepartment {
        name: "Electrical Engineering",
        code: "ELECTRICAL",
        description: "Power systems and electrical technology",
        trade_code: Some("BTECH"),
    },
];

const PG_DEPARTMENTS: &[SeedDepartment] = &[
    SeedDepartment {
        name: "Master of Computer Applications",
        code: "MCA",
        description: "Advanced computer applications and research",
        trade_code: None,
    },
    SeedDepartment {
        name: "Master of Business Administration",
        code: "MBA",
        description: "Business leadership and management",
        trade_code: None,
    },
];

/// 空库时写入预置的 UG/PG 及其 trade 与示例部门；已有数据则什么也不做
pub async fn seed_if_empty(db: &DatabaseConnection) -> Result<bool, sea_orm::DbErr> {
    if ProgramRepository::count(db).await? > 0 {
        return Ok(false);
    }

    seed_program(db, "UG", "Undergraduate programmes", UG_TRADES, UG_DEPARTMENTS).await?;
    seed_program(db, "PG", "Postgraduate programmes", PG_TRADES, PG_DEPARTMENTS).await?;

    info!("Seeded predefined programs, trades and departments.");
    Ok(true)
}

async fn seed_program(
    db: &DatabaseConnection,
    code: &str,
    description: &str,
    trades: &[(&str, &str)],
    departments: &[SeedDepartment],
) -> Result<(), sea_orm::DbErr> {
    let program = ProgramRepository::insert(
        db,
        NewProgram {
            name: code.to_string(),
            code: code.to_string(),
            description: Some(description.to_string()),
            is_predefined: true,
            is_active: true,
        },
    )
    .await?;

    let mut trade_ids = Vec::with_capacity(trades.len());
    for (name, trade_code) in trades {
        let trade = TradeRepository::insert(
            db,
            NewTrade {
                name: name.to_string(),
                code: trade_code.to_string(),
                program_id: program.id.clone(),
                description: None,
                is_predefined: true,
                is_active: true,
            },
        )
        .await?;
        trade_ids.push((*trade_code, trade.id));
    }

    for dept in departments {
        let trade_id = dept.trade_code.and_then(|code| {
            trade_ids
                .iter()
                .find(|(c, _)| *c == code)
                .map(|(_, id)| id.clone())
        });
        DepartmentRepository::insert(
            db,
            DepartmentRecord {
                program_id: program.id.clone(),
                is_direct_branch: trade_id.is_none(),
                trade_id,
                name: dept.name.to_string(),
                code: dept.code.to_string(),
                description: Some(dept.description.to_string()),
                is_active: true,
                ..Default::default()
            },
        )
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::establish_connection;

    #[tokio::test]
    async fn seeds_once() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("seed.db").display());
        let db = establish_connection(&url).await.unwrap();

        assert!(seed_if_empty(&db).await.unwrap());
        assert!(!seed_if_empty(&db).await.unwrap());

        let programs = ProgramRepository::list_active(&db).await.unwrap();
        assert_eq!(programs.len(), 2);
        let departments = DepartmentRepository::list_all(&db).await.unwrap();
        assert_eq!(departments.len(), 6);
        for d in &departments {
            assert!(d.trade_id.is_some() != d.is_direct_branch, "{}", d.code);
        }
    }
}
