use crate::entity::Role;

/// Inline button payloads. Telegram caps callback data at 64 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
  Buy,
  SelectPackage(i32),
  Redeem,
  Back,
  VerifyJoin,
  Cancel,

  AdminMenu,
  GenToken,
  TokenPackage(i32),
  Pending,
  Packages,
  ViewPackages,
  AddPackage,
  TogglePackage(i32),
  Upi,
  ViewUpi,
  AddUpi,
  ActivateUpi(i32),
  Admins,
  ViewAdmins,
  AddAdmin,
  AdminRole(Role),
  DeactivateAdmin(i64),
  Settings,
  ViewSettings,
  EditChannel,
  EditApi,
  Stats,
  Approve(i32),
  Reject(i32),
  AdminCancel,
}

impl Callback {
  pub fn to_data(&self) -> String {
    match self {
      Callback::Buy => "buy".into(),
      Callback::SelectPackage(id) => format!("pkg:{id}"),
      Callback::Redeem => "redeem".into(),
      Callback::Back => "back".into(),
      Callback::VerifyJoin => "verify_join".into(),
      Callback::Cancel => "cancel".into(),

      Callback::AdminMenu => "adm".into(),
      Callback::GenToken => "adm_gen".into(),
      Callback::TokenPackage(id) => format!("adm_tpkg:{id}"),
      Callback::Pending => "adm_pending".into(),
      Callback::Packages => "adm_pkgs".into(),
      Callback::ViewPackages => "adm_pkgs_view".into(),
      Callback::AddPackage => "adm_pkg_add".into(),
      Callback::TogglePackage(id) => format!("adm_pkg_toggle:{id}"),
      Callback::Upi => "adm_upi".into(),
      Callback::ViewUpi => "adm_upi_view".into(),
      Callback::AddUpi => "adm_upi_add".into(),
      Callback::ActivateUpi(id) => format!("adm_upi_on:{id}"),
      Callback::Admins => "adm_admins".into(),
      Callback::ViewAdmins => "adm_admins_view".into(),
      Callback::AddAdmin => "adm_admin_add".into(),
      Callback::AdminRole(Role::Super) => "adm_role:super".into(),
      Callback::AdminRole(Role::Limited) => "adm_role:limited".into(),
      Callback::DeactivateAdmin(id) => format!("adm_admin_off:{id}"),
      Callback::Settings => "adm_settings".into(),
      Callback::ViewSettings => "adm_settings_view".into(),
      Callback::EditChannel => "adm_channel".into(),
      Callback::EditApi => "adm_api".into(),
      Callback::Stats => "adm_stats".into(),
      Callback::Approve(id) => format!("approve:{id}"),
      Callback::Reject(id) => format!("reject:{id}"),
      Callback::AdminCancel => "adm_cancel".into(),
    }
  }

  pub fn from_data(data: &str) -> Option<Self> {
    let (head, arg) = match data.split_once(':') {
      Some((head, arg)) => (head, Some(arg)),
      None => (data, None),
    };

    let callback = match (head, arg) {
      ("buy", None) => Callback::Buy,
      ("pkg", Some(id)) => Callback::SelectPackage(id.parse().ok()?),
      ("redeem", None) => Callback::Redeem,
      ("back", None) => Callback::Back,
      ("verify_join", None) => Callback::VerifyJoin,
      ("cancel", None) => Callback::Cancel,

      ("adm", None) => Callback::AdminMenu,
      ("adm_gen", None) => Callback::GenToken,
      ("adm_tpkg", Some(id)) => Callback::TokenPackage(id.parse().ok()?),
      ("adm_pending", None) => Callback::Pending,
      ("adm_pkgs", None) => Callback::Packages,
      ("adm_pkgs_view", None) => Callback::ViewPackages,
      ("adm_pkg_add", None) => Callback::AddPackage,
      ("adm_pkg_toggle", Some(id)) => Callback::TogglePackage(id.parse().ok()?),
      ("adm_upi", None) => Callback::Upi,
      ("adm_upi_view", None) => Callback::ViewUpi,
      ("adm_upi_add", None) => Callback::AddUpi,
      ("adm_upi_on", Some(id)) => Callback::ActivateUpi(id.parse().ok()?),
      ("adm_admins", None) => Callback::Admins,
      ("adm_admins_view", None) => Callback::ViewAdmins,
      ("adm_admin_add", None) => Callback::AddAdmin,
      ("adm_role", Some("super")) => Callback::AdminRole(Role::Super),
      ("adm_role", Some("limited")) => Callback::AdminRole(Role::Limited),
      ("adm_admin_off", Some(id)) => {
        Callback::DeactivateAdmin(id.parse().ok()?)
      }
      ("adm_settings", None) => Callback::Settings,
      ("adm_settings_view", None) => Callback::ViewSettings,
      ("adm_channel", None) => Callback::EditChannel,
      ("adm_api", None) => Callback::EditApi,
      ("adm_stats", None) => Callback::Stats,
      ("approve", Some(id)) => Callback::Approve(id.parse().ok()?),
      ("reject", Some(id)) => Callback::Reject(id.parse().ok()?),
      ("adm_cancel", None) => Callback::AdminCancel,
      _ => return None,
    };

    Some(callback)
  }
}
