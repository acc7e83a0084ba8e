use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Leads::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Leads::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Leads::FirstName).string().not_null())
                    .col(ColumnDef::new(Leads::MiddleName).string().null())
                    .col(ColumnDef::new(Leads::LastName).string().not_null())
                    .col(ColumnDef::new(Leads::CompanyName).string().null())
                    .col(ColumnDef::new(Leads::Email).string().not_null())
                    .col(ColumnDef::new(Leads::Phone).string().not_null())
                    .col(ColumnDef::new(Leads::Source).string().null())
                    .col(ColumnDef::new(Leads::Status).string().not_null())
                    .col(ColumnDef::new(Leads::Service).string().null())
                    .col(ColumnDef::new(Leads::LeadType).string().null())
                    .col(ColumnDef::new(Leads::Priority).string().null())
                    .col(ColumnDef::new(Leads::DealValue).double().null())
                    .col(ColumnDef::new(Leads::AssignedRm).string().null())
                    .col(ColumnDef::new(Leads::Notes).text().null())
                    .col(ColumnDef::new(Leads::CreatedBy).integer().not_null())
                    .col(ColumnDef::new(Leads::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Leads::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Customers::LeadId).integer().null())
                    .col(ColumnDef::new(Customers::Name).string().not_null())
                    .col(ColumnDef::new(Customers::Email).string().not_null())
                    .col(ColumnDef::new(Customers::Phone).string().not_null())
                    .col(ColumnDef::new(Customers::ApplicantType).string().null())
                    .col(ColumnDef::new(Customers::EntityType).string().null())
                    .col(ColumnDef::new(Customers::Pan).string().null())
                    .col(ColumnDef::new(Customers::Gstin).string().null())
                    .col(ColumnDef::new(Customers::Cin).string().null())
                    .col(ColumnDef::new(Customers::Address).text().null())
                    .col(ColumnDef::new(Customers::City).string().null())
                    .col(ColumnDef::new(Customers::Pincode).string().null())
                    .col(ColumnDef::new(Customers::Country).string().null())
                    .col(ColumnDef::new(Customers::ContactPerson).string().null())
                    .col(ColumnDef::new(Customers::Designation).string().null())
                    .col(ColumnDef::new(Customers::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Customers::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Leads::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum Leads {
    Table,
    Id,
    FirstName,
    MiddleName,
    LastName,
    CompanyName,
    Email,
    Phone,
    Source,
    Status,
    Service,
    LeadType,
    Priority,
    DealValue,
    AssignedRm,
    Notes,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Customers {
    Table,
    Id,
    LeadId,
    Name,
    Email,
    Phone,
    ApplicantType,
    EntityType,
    Pan,
    Gstin,
    Cin,
    Address,
    City,
    Pincode,
    Country,
    ContactPerson,
    Designation,
    CreatedAt,
    UpdatedAt,
}
