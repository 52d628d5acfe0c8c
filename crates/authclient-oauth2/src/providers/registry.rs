// Provider registry: built-in provider profiles.

use crate::profile::{
    ApiAuth, ApiCall, AuthenticationMethod, ParamNames, ProviderProfile, UserInfoStrategy,
    ViewOptions, STANDARD_PARAM_NAMES,
};
use crate::response::ResponseQuirk;

const POPUP_800_500: ViewOptions = ViewOptions {
    popup_width: 800,
    popup_height: 500,
};

// --- QQ ---
// Token and `me` endpoints answer text/html; `me` wraps its JSON in `callback( ... );`.
pub static QQ: ProviderProfile = ProviderProfile {
    id: "qq",
    title: "QQ",
    authorize_url: "https://graph.qq.com/oauth2.0/authorize",
    token_url: "https://graph.qq.com/oauth2.0/token",
    api_base_url: "https://graph.qq.com",
    default_scope: "get_user_info",
    attribute_map: &[("username", "nickname")],
    response_quirk: ResponseQuirk::CallbackWrappedJson,
    user_info: UserInfoStrategy::TwoStep {
        lookup: ApiCall::get("oauth2.0/me"),
        id_field: "openid",
        profile: ApiCall::get("user/get_user_info"),
        forward: &[("oauth_consumer_key", "client_id"), ("openid", "openid")],
    },
    param_names: STANDARD_PARAM_NAMES,
    exchange_redirect_uri: true,
    auth_method: AuthenticationMethod::Post,
    api_auth: ApiAuth::Param("access_token"),
    api_token_params: &[],
    token_id_param: None,
    error_fields: &["error", "ret"],
    view_options: POPUP_800_500,
};

// --- WeChat ---
pub static WECHAT: ProviderProfile = ProviderProfile {
    id: "wechat",
    title: "WeChat",
    authorize_url: "https://open.weixin.qq.com/connect/qrconnect",
    token_url: "https://api.weixin.qq.com/sns/oauth2/access_token",
    api_base_url: "https://api.weixin.qq.com",
    default_scope: "snsapi_login",
    attribute_map: &[("id", "openid"), ("username", "nickname")],
    response_quirk: ResponseQuirk::None,
    user_info: UserInfoStrategy::SingleCall(ApiCall::get("sns/userinfo")),
    param_names: ParamNames {
        client_id: "appid",
        client_secret: "secret",
    },
    exchange_redirect_uri: false,
    auth_method: AuthenticationMethod::Post,
    api_auth: ApiAuth::Param("access_token"),
    api_token_params: &["openid"],
    token_id_param: Some("openid"),
    error_fields: &["errcode"],
    view_options: POPUP_800_500,
};

// --- Weibo ---
pub static WEIBO: ProviderProfile = ProviderProfile {
    id: "weibo",
    title: "WeiBo",
    authorize_url: "https://api.weibo.com/oauth2/authorize",
    token_url: "https://api.weibo.com/oauth2/access_token",
    api_base_url: "https://api.weibo.com",
    default_scope: "follow_app_official_microblog",
    attribute_map: &[("username", "name")],
    response_quirk: ResponseQuirk::None,
    user_info: UserInfoStrategy::TwoStep {
        lookup: ApiCall::post("oauth2/get_token_info"),
        id_field: "uid",
        profile: ApiCall::get("2/users/show.json"),
        forward: &[("uid", "uid")],
    },
    param_names: STANDARD_PARAM_NAMES,
    exchange_redirect_uri: true,
    auth_method: AuthenticationMethod::Post,
    api_auth: ApiAuth::Param("access_token"),
    api_token_params: &[],
    token_id_param: None,
    error_fields: &["error", "error_code"],
    view_options: POPUP_800_500,
};

/// Lookup a provider profile by its ID string.
pub fn get_provider_profile(id: &str) -> Option<&'static ProviderProfile> {
    match id {
        "qq" => Some(&QQ),
        "wechat" | "weixin" => Some(&WECHAT),
        "weibo" => Some(&WEIBO),
        _ => None,
    }
}

/// All provider IDs.
pub const PROVIDER_IDS: &[&str] = &["qq", "wechat", "weibo"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_providers_registered() {
        for id in PROVIDER_IDS {
            let profile = get_provider_profile(id);
            assert!(profile.is_some(), "Provider '{id}' not registered");
            assert_eq!(profile.unwrap().id, *id);
        }
        assert!(get_provider_profile("facebook").is_none());
    }

    #[test]
    fn test_weixin_alias() {
        assert_eq!(get_provider_profile("weixin").unwrap().id, "wechat");
    }

    #[test]
    fn test_qq_profile() {
        let qq = get_provider_profile("qq").unwrap();
        assert_eq!(qq.authorize_url, "https://graph.qq.com/oauth2.0/authorize");
        assert_eq!(qq.default_scope, "get_user_info");
        assert_eq!(qq.response_quirk, ResponseQuirk::CallbackWrappedJson);
        assert!(matches!(
            qq.user_info,
            UserInfoStrategy::TwoStep { id_field: "openid", .. }
        ));
    }

    #[test]
    fn test_wechat_uses_appid() {
        assert_eq!(WECHAT.param_names.client_id, "appid");
        assert_eq!(WECHAT.param_names.client_secret, "secret");
        assert!(!WECHAT.exchange_redirect_uri);
        assert_eq!(WECHAT.api_token_params, &["openid"]);
    }

    #[test]
    fn test_token_id_param_only_on_single_call_profiles() {
        for id in PROVIDER_IDS {
            let profile = get_provider_profile(id).unwrap();
            if matches!(profile.user_info, UserInfoStrategy::TwoStep { .. }) {
                assert_eq!(profile.token_id_param, None, "{id}");
            }
        }
        assert_eq!(WECHAT.token_id_param, Some("openid"));
    }

    #[test]
    fn test_every_profile_has_popup_hint() {
        for id in PROVIDER_IDS {
            let view = get_provider_profile(id).unwrap().view_options;
            assert_eq!((view.popup_width, view.popup_height), (800, 500));
        }
    }
}
